//! Immutable embedding store. Position in the store is the item id.

use crate::error::{Result, RecommenderError};
use crate::vector::Vector;

/// Fixed set of item embeddings sharing one dimension.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    vectors: Vec<Vector>,
    dimension: usize,
}

impl EmbeddingStore {
    /// Build a store from vectors in item-id order.
    ///
    /// The dimension is taken from the first vector; every other vector must
    /// match it. Use [`EmbeddingStore::empty`] for a store with no items.
    pub fn new(vectors: Vec<Vector>) -> Result<Self> {
        let dimension = match vectors.first() {
            Some(v) => v.dimension(),
            None => {
                return Err(RecommenderError::invalid_argument(
                    "embedding store needs at least one vector to infer its dimension",
                ))
            }
        };
        if dimension == 0 {
            return Err(RecommenderError::invalid_argument(
                "embedding dimension must be positive",
            ));
        }

        if let Some(bad) = vectors.iter().find(|v| v.dimension() != dimension) {
            return Err(RecommenderError::DimensionMismatch {
                expected: dimension,
                actual: bad.dimension(),
            });
        }

        Ok(Self { vectors, dimension })
    }

    /// An item-less store with a fixed dimension.
    pub fn empty(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RecommenderError::invalid_argument(
                "embedding dimension must be positive",
            ));
        }
        Ok(Self {
            vectors: Vec::new(),
            dimension,
        })
    }

    /// Build a store from raw rows, e.g. a deserialized embedding matrix.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        Self::new(rows.into_iter().map(Vector::new).collect())
    }

    pub fn get(&self, item_id: usize) -> Result<&Vector> {
        self.vectors
            .get(item_id)
            .ok_or_else(|| RecommenderError::item_not_found(item_id))
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[Vector] {
        &self.vectors
    }
}
