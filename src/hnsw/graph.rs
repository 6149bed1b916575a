//! HNSW graph: construction and layered search.
//!
//! Implements the Hierarchical Navigable Small World graph from:
//! "Efficient and robust approximate nearest neighbor search using
//!  Hierarchical Navigable Small World graphs" (Malkov & Yashunin, 2016/2018).
//!
//! The graph is built in one batch over unit-length vectors and is never
//! mutated afterwards. Node levels come from a seeded RNG, so the same input
//! always produces the same graph.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::distance::unit_cosine_distance;
use crate::error::{Result, RecommenderError};

use super::candidate_queue::{Candidate, Frontier, ResultSet};

/// Distances at or below this are treated as the same point.
const SAME_POINT: f32 = 1e-6;

/// Configuration parameters for the HNSW index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswParams {
    /// Max number of connections per node (layers > 0).
    pub m: usize,
    /// Max connections at layer 0 (typically 2 * m).
    pub m_max0: usize,
    /// Number of candidates during construction.
    pub ef_construction: usize,
    /// Number of candidates during search.
    pub ef_search: usize,
    /// Maximum number of layers.
    pub max_layers: usize,
    /// Seed for level assignment.
    pub seed: u64,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self::new(16, 200, 50)
    }
}

impl HnswParams {
    pub fn new(m: usize, ef_construction: usize, ef_search: usize) -> Self {
        Self {
            m,
            m_max0: 2 * m,
            ef_construction,
            ef_search,
            max_layers: 16,
            seed: 42,
        }
    }

    /// Level generation factor: 1 / ln(m).
    pub fn level_multiplier(&self) -> f64 {
        1.0 / (self.m as f64).ln()
    }

    pub fn validate(&self) -> Result<()> {
        let problem = if self.m < 2 {
            Some("m must be at least 2")
        } else if self.m_max0 < self.m {
            Some("m_max0 must be at least m")
        } else if self.ef_construction == 0 {
            Some("ef_construction must be positive")
        } else if self.ef_search == 0 {
            Some("ef_search must be positive")
        } else if self.max_layers == 0 {
            Some("max_layers must be positive")
        } else {
            None
        };

        match problem {
            Some(reason) => Err(RecommenderError::IndexBuild(format!(
                "invalid HNSW parameters: {}",
                reason
            ))),
            None => Ok(()),
        }
    }
}

/// Per-node adjacency. `neighbors[l]` holds the links at layer `l`.
#[derive(Debug, Clone)]
struct Node {
    level: usize,
    neighbors: Vec<Vec<usize>>,
}

impl Node {
    fn new(level: usize) -> Self {
        Self {
            level,
            neighbors: vec![Vec::new(); level + 1],
        }
    }

    fn links(&self, layer: usize) -> &[usize] {
        self.neighbors.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The HNSW graph structure. Node id = position of the vector it was built from.
#[derive(Debug)]
pub struct HnswGraph {
    /// Unit-length vectors, indexed by node id.
    vectors: Vec<Vec<f32>>,
    nodes: Vec<Node>,
    /// Entry point node ID (highest-level node).
    entry_point: Option<usize>,
    max_level: usize,
    params: HnswParams,
}

impl HnswGraph {
    /// Build the graph over `vectors`, which must already be unit length.
    pub fn build(vectors: Vec<Vec<f32>>, params: HnswParams) -> Result<Self> {
        params.validate()?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let nodes = (0..vectors.len())
            .map(|_| Node::new(random_level(&mut rng, &params)))
            .collect();

        let mut graph = Self {
            vectors,
            nodes,
            entry_point: None,
            max_level: 0,
            params,
        };
        for id in 0..graph.vectors.len() {
            graph.insert(id);
        }
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    fn distance(&self, query: &[f32], node_id: usize) -> f32 {
        unit_cosine_distance(query, &self.vectors[node_id])
    }

    fn max_connections(&self, layer: usize) -> usize {
        if layer == 0 {
            self.params.m_max0
        } else {
            self.params.m
        }
    }

    /// SEARCH-LAYER: Algorithm 2 from the HNSW paper.
    ///
    /// Returns up to `ef` nodes closest to `query` on `layer`, ascending.
    fn search_layer(
        &self,
        query: &[f32],
        entry_points: &[Candidate],
        ef: usize,
        layer: usize,
    ) -> Vec<Candidate> {
        let mut visited: HashSet<usize> = entry_points.iter().map(|c| c.id).collect();
        let mut frontier = Frontier::new();
        let mut results = ResultSet::with_capacity(ef.min(self.len()));

        for &ep in entry_points {
            frontier.push(ep);
            results.push(ep);
        }

        while let Some(c) = frontier.pop() {
            // Nearest unexpanded node is worse than everything kept: done
            if c.distance > results.bound() {
                break;
            }

            for &neighbor_id in self.nodes[c.id].links(layer) {
                if !visited.insert(neighbor_id) {
                    continue;
                }

                let dist = self.distance(query, neighbor_id);
                if dist < results.bound() {
                    let n = Candidate::new(neighbor_id, dist);
                    frontier.push(n);
                    results.push(n);
                }
            }
        }

        results.into_sorted_vec()
    }

    /// SELECT-NEIGHBORS-HEURISTIC: Algorithm 4 with kept pruned connections.
    ///
    /// `candidates` must be ascending by distance. A candidate is taken when
    /// it is closer to the base than to every neighbor already taken; the
    /// rest top the list up to `m`.
    ///
    /// Copies of the base (distance ~0) say nothing about direction: at most
    /// one is taken in the first pass and they never veto other candidates,
    /// so a large group of identical vectors keeps links out of the group.
    fn select_neighbors(&self, candidates: &[Candidate], m: usize) -> Vec<usize> {
        let mut selected: Vec<Candidate> = Vec::with_capacity(m);
        let mut skipped = Vec::new();

        for &c in candidates {
            if selected.len() >= m {
                break;
            }
            let diverse = if c.distance <= SAME_POINT {
                selected.iter().all(|s| s.distance > SAME_POINT)
            } else {
                selected.iter().filter(|s| s.distance > SAME_POINT).all(|s| {
                    unit_cosine_distance(&self.vectors[c.id], &self.vectors[s.id]) > c.distance
                })
            };
            if diverse {
                selected.push(c);
            } else {
                skipped.push(c);
            }
        }

        let missing = m.saturating_sub(selected.len());
        selected.extend(skipped.into_iter().take(missing));
        selected.into_iter().map(|c| c.id).collect()
    }

    /// Re-select a node's links at `layer` once they exceed `cap`.
    fn shrink_connections(&mut self, node_id: usize, layer: usize, cap: usize) {
        let base = &self.vectors[node_id];
        let mut scored: Vec<Candidate> = self.nodes[node_id]
            .links(layer)
            .iter()
            .map(|&e| Candidate::new(e, unit_cosine_distance(base, &self.vectors[e])))
            .collect();
        scored.sort();

        let kept = self.select_neighbors(&scored, cap);
        self.nodes[node_id].neighbors[layer] = kept;
    }

    /// INSERT: Algorithm 1 from the HNSW paper.
    fn insert(&mut self, id: usize) {
        let level = self.nodes[id].level;

        let entry_point = match self.entry_point {
            None => {
                self.entry_point = Some(id);
                self.max_level = level;
                return;
            }
            Some(ep) => ep,
        };

        let query = self.vectors[id].clone();
        let mut eps = vec![Candidate::new(entry_point, self.distance(&query, entry_point))];

        // Phase 1: Greedy descent from top layer down to level+1 (ef=1)
        for l in (level + 1..=self.max_level).rev() {
            eps = self.search_layer(&query, &eps, 1, l);
        }

        // Phase 2: Link at layers min(level, max_level) down to 0
        for l in (0..=level.min(self.max_level)).rev() {
            let found = self.search_layer(&query, &eps, self.params.ef_construction, l);
            let neighbors = self.select_neighbors(&found, self.params.m);
            let cap = self.max_connections(l);

            for &neighbor_id in &neighbors {
                let links = &mut self.nodes[neighbor_id].neighbors[l];
                links.push(id);
                if links.len() > cap {
                    self.shrink_connections(neighbor_id, l, cap);
                }
            }
            self.nodes[id].neighbors[l] = neighbors;

            eps = found;
        }

        if level > self.max_level {
            self.entry_point = Some(id);
            self.max_level = level;
        }
    }

    /// SEARCH: Algorithm 5 from the HNSW paper.
    ///
    /// `query` must be unit length. Returns `min(k, len)` nodes ascending by
    /// distance, using a beam of `max(ef, k)` on layer 0. When `k` covers the
    /// whole graph, or the beam comes back short, the answer is computed
    /// exhaustively instead.
    pub fn search(&self, query: &[f32], k: usize, ef: usize) -> Vec<Candidate> {
        let k = k.min(self.len());
        if k == self.len() {
            return self.exhaustive_search(query, k);
        }
        let entry_point = match self.entry_point {
            Some(ep) => ep,
            None => return Vec::new(),
        };

        let mut eps = vec![Candidate::new(entry_point, self.distance(query, entry_point))];

        for l in (1..=self.max_level).rev() {
            eps = self.search_layer(query, &eps, 1, l);
        }

        let mut results = self.search_layer(query, &eps, ef.max(k), 0);
        if results.len() < k {
            return self.exhaustive_search(query, k);
        }
        results.truncate(k);
        results
    }

    /// Exact scan over every node, ascending by `(distance, id)`.
    fn exhaustive_search(&self, query: &[f32], k: usize) -> Vec<Candidate> {
        let mut all: Vec<Candidate> = (0..self.len())
            .map(|id| Candidate::new(id, self.distance(query, id)))
            .collect();
        all.sort();
        all.truncate(k);
        all
    }
}

/// Draw a level from the exponentially decaying distribution `floor(-ln(U) * ml)`.
fn random_level(rng: &mut StdRng, params: &HnswParams) -> usize {
    let r: f64 = rng.gen();
    let level = (-r.ln() * params.level_multiplier()).floor() as usize;
    level.min(params.max_layers - 1)
}
