//! HNSW (Hierarchical Navigable Small World) index module.

pub mod candidate_queue;
pub mod graph;

pub use graph::{HnswGraph, HnswParams};

use std::time::Instant;

use tracing::info;

use crate::error::Result;
use crate::index::{normalize_store, prepare_query, SimilarityIndex};
use crate::store::EmbeddingStore;
use crate::vector::Vector;

/// An HNSW-based approximate nearest neighbor index under cosine distance.
#[derive(Debug)]
pub struct HnswIndex {
    graph: HnswGraph,
    dimension: usize,
}

impl HnswIndex {
    /// Search with a specific ef value for runtime tuning.
    pub fn search_with_ef(&self, query: &Vector, k: usize, ef: usize) -> Result<Vec<(usize, f32)>> {
        let query = prepare_query(query, k, self.dimension)?;
        Ok(self
            .graph
            .search(&query, k, ef)
            .into_iter()
            .map(|c| (c.id, c.distance))
            .collect())
    }
}

impl SimilarityIndex for HnswIndex {
    type Params = HnswParams;

    /// Normalization runs across the rayon pool; graph insertion is
    /// sequential so the result does not depend on thread scheduling.
    fn build(store: &EmbeddingStore, params: HnswParams) -> Result<Self> {
        let start = Instant::now();
        let vectors = normalize_store(store)?;
        let graph = HnswGraph::build(vectors, params)?;

        info!(
            items = graph.len(),
            dimension = store.dimension(),
            levels = graph.max_level() + 1,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built HNSW index"
        );

        Ok(Self {
            graph,
            dimension: store.dimension(),
        })
    }

    fn query(&self, vector: &Vector, k: usize) -> Result<Vec<(usize, f32)>> {
        self.search_with_ef(vector, k, self.graph.params().ef_search)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.graph.len()
    }
}
