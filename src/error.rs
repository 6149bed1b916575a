//! Error types for the recommender

use thiserror::Error;

/// Result type alias for recommender operations
pub type Result<T> = std::result::Result<T, RecommenderError>;

/// Error types that can occur while building indexes or serving recommendations
#[derive(Error, Debug)]
pub enum RecommenderError {
    #[error("Not found: {what} {id}")]
    NotFound { what: &'static str, id: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index build failed: {0}")]
    IndexBuild(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt embedding snapshot: {0}")]
    CorruptSnapshot(String),
}

impl RecommenderError {
    /// Unknown item id in the embedding store.
    pub fn item_not_found(id: usize) -> Self {
        RecommenderError::NotFound {
            what: "item",
            id: id.to_string(),
        }
    }

    /// Item id with no catalog entry.
    pub fn book_not_found(id: usize) -> Self {
        RecommenderError::NotFound {
            what: "book",
            id: id.to_string(),
        }
    }

    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        RecommenderError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RecommenderError::NotFound { .. })
    }

    /// Caller-side input errors: bad counts, wrong dimension, degenerate vectors.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            RecommenderError::InvalidArgument { .. } | RecommenderError::DimensionMismatch { .. }
        )
    }
}
