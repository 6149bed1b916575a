//! Exact brute-force index: O(n) cosine scan per query

use rayon::prelude::*;

use crate::distance::unit_cosine_distance;
use crate::error::Result;
use crate::index::{by_distance_then_id, normalize_store, prepare_query, SimilarityIndex};
use crate::store::EmbeddingStore;
use crate::vector::Vector;

/// A flat index that computes the distance to every stored vector.
///
/// Exact, so it doubles as ground truth for HNSW recall checks and is the
/// better choice for small catalogs.
#[derive(Debug)]
pub struct FlatIndex {
    /// Unit-length vectors, position = item id.
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

impl SimilarityIndex for FlatIndex {
    type Params = ();

    fn build(store: &EmbeddingStore, _params: ()) -> Result<Self> {
        Ok(Self {
            vectors: normalize_store(store)?,
            dimension: store.dimension(),
        })
    }

    fn query(&self, vector: &Vector, k: usize) -> Result<Vec<(usize, f32)>> {
        let query = prepare_query(vector, k, self.dimension)?;

        let mut results: Vec<(usize, f32)> = self
            .vectors
            .par_iter()
            .enumerate()
            .map(|(id, v)| (id, unit_cosine_distance(&query, v)))
            .collect();

        if results.len() > k {
            results.select_nth_unstable_by(k - 1, by_distance_then_id);
            results.truncate(k);
        }
        results.sort_by(by_distance_then_id);
        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }
}
