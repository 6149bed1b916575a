//! Serialization helpers: bincode for the embedding matrix, JSON for catalog and config.

use crate::error::{Result, RecommenderError};
use serde::{Deserialize, Serialize};

pub fn to_bincode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| RecommenderError::Serialization(e.to_string()))
}

pub fn from_bincode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| RecommenderError::Serialization(e.to_string()))
}

pub fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| RecommenderError::Serialization(e.to_string()))
}

pub fn from_json<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| RecommenderError::Serialization(e.to_string()))
}
