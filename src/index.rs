//! Similarity index capability shared by the exact and HNSW backends

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::config::{IndexConfig, IndexKind};
use crate::error::{Result, RecommenderError};
use crate::flat_index::FlatIndex;
use crate::hnsw::HnswIndex;
use crate::store::EmbeddingStore;
use crate::vector::Vector;

/// A read-only k-NN index under cosine distance, built once from an
/// [`EmbeddingStore`].
///
/// Item ids returned by `query` are positions in the store the index was
/// built from. Implementations are immutable after `build`, so a shared
/// reference can serve any number of concurrent queries.
pub trait SimilarityIndex: Send + Sync {
    /// Backend-specific build parameters.
    type Params;

    /// Build the index over every vector in `store`.
    fn build(store: &EmbeddingStore, params: Self::Params) -> Result<Self>
    where
        Self: Sized;

    /// The `k` nearest items to `vector` as `(item_id, distance)` pairs,
    /// ascending by distance with ties broken by item id.
    fn query(&self, vector: &Vector, k: usize) -> Result<Vec<(usize, f32)>>;

    /// Dimension of the indexed vectors.
    fn dimension(&self) -> usize;

    /// Number of indexed items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runtime choice between the index backends.
#[derive(Debug)]
pub enum AnyIndex {
    Flat(FlatIndex),
    Hnsw(HnswIndex),
}

impl AnyIndex {
    pub fn kind(&self) -> IndexKind {
        match self {
            AnyIndex::Flat(_) => IndexKind::Flat,
            AnyIndex::Hnsw(_) => IndexKind::Hnsw,
        }
    }
}

impl SimilarityIndex for AnyIndex {
    type Params = IndexConfig;

    fn build(store: &EmbeddingStore, params: IndexConfig) -> Result<Self> {
        match params.kind {
            IndexKind::Flat => Ok(AnyIndex::Flat(FlatIndex::build(store, ())?)),
            IndexKind::Hnsw => Ok(AnyIndex::Hnsw(HnswIndex::build(store, params.hnsw)?)),
        }
    }

    fn query(&self, vector: &Vector, k: usize) -> Result<Vec<(usize, f32)>> {
        match self {
            AnyIndex::Flat(index) => index.query(vector, k),
            AnyIndex::Hnsw(index) => index.query(vector, k),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            AnyIndex::Flat(index) => index.dimension(),
            AnyIndex::Hnsw(index) => index.dimension(),
        }
    }

    fn len(&self) -> usize {
        match self {
            AnyIndex::Flat(index) => index.len(),
            AnyIndex::Hnsw(index) => index.len(),
        }
    }
}

/// Order by distance, then by item id so equal distances come out stable.
pub(crate) fn by_distance_then_id(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}

/// Unit-length copies of every stored vector, computed in parallel.
///
/// Fails with `IndexBuild` if the store is empty or any vector has a zero or
/// non-finite norm, since cosine distance is undefined for it.
pub(crate) fn normalize_store(store: &EmbeddingStore) -> Result<Vec<Vec<f32>>> {
    if store.is_empty() {
        return Err(RecommenderError::IndexBuild(
            "embedding store is empty".to_string(),
        ));
    }

    store
        .vectors()
        .par_iter()
        .enumerate()
        .map(|(id, v)| {
            if !v.is_finite() {
                return Err(RecommenderError::IndexBuild(format!(
                    "item {} has a non-finite component",
                    id
                )));
            }
            v.normalized()
                .map(Vector::into_inner)
                .map_err(|_| RecommenderError::IndexBuild(format!("item {} has a zero vector", id)))
        })
        .collect()
}

/// Validate a query against the index and return its unit-length form.
pub(crate) fn prepare_query(vector: &Vector, k: usize, dimension: usize) -> Result<Vec<f32>> {
    if k == 0 {
        return Err(RecommenderError::invalid_argument("k must be positive"));
    }
    if vector.dimension() != dimension {
        return Err(RecommenderError::DimensionMismatch {
            expected: dimension,
            actual: vector.dimension(),
        });
    }
    Ok(vector.normalized()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hnsw::HnswParams;

    fn store() -> EmbeddingStore {
        EmbeddingStore::from_rows(vec![
            vec![1.0, 0.0],
            vec![0.9, 0.1],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_tie_break_by_id() {
        let mut pairs = vec![(3, 0.5), (1, 0.5), (2, 0.1)];
        pairs.sort_by(by_distance_then_id);
        assert_eq!(pairs, vec![(2, 0.1), (1, 0.5), (3, 0.5)]);
    }

    #[test]
    fn test_normalize_store_rejects_zero_vector() {
        let store = EmbeddingStore::from_rows(vec![vec![1.0, 0.0], vec![0.0, 0.0]]).unwrap();
        assert!(matches!(
            normalize_store(&store),
            Err(RecommenderError::IndexBuild(_))
        ));
    }

    #[test]
    fn test_normalize_store_rejects_empty() {
        let store = EmbeddingStore::empty(4).unwrap();
        assert!(matches!(
            normalize_store(&store),
            Err(RecommenderError::IndexBuild(_))
        ));
    }

    #[test]
    fn test_prepare_query_errors() {
        let v = Vector::new(vec![1.0, 0.0]);
        assert!(prepare_query(&v, 0, 2).unwrap_err().is_invalid_argument());
        assert!(prepare_query(&v, 1, 3).unwrap_err().is_invalid_argument());
        let zero = Vector::new(vec![0.0, 0.0]);
        assert!(prepare_query(&zero, 1, 2).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_any_index_backends_agree_on_top_hit() {
        let store = store();
        let flat = AnyIndex::build(
            &store,
            IndexConfig {
                kind: IndexKind::Flat,
                hnsw: HnswParams::default(),
            },
        )
        .unwrap();
        let hnsw = AnyIndex::build(
            &store,
            IndexConfig {
                kind: IndexKind::Hnsw,
                hnsw: HnswParams::new(4, 32, 16),
            },
        )
        .unwrap();

        assert_eq!(flat.kind(), IndexKind::Flat);
        assert_eq!(hnsw.kind(), IndexKind::Hnsw);
        assert_eq!(flat.len(), 4);
        assert_eq!(hnsw.dimension(), 2);

        let q = Vector::new(vec![1.0, 0.05]);
        let a = flat.query(&q, 2).unwrap();
        let b = hnsw.query(&q, 2).unwrap();
        assert_eq!(a[0].0, b[0].0);
    }
}
