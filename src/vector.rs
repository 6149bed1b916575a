//! Embedding vector type

use crate::error::{Result, RecommenderError};
use serde::{Deserialize, Serialize};

/// A dense embedding in d-dimensional space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// L2 norm (magnitude)
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Whether every component is a finite float.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Scale to unit length in place
    pub fn normalize(&mut self) -> Result<()> {
        let norm = self.norm();
        if norm == 0.0 || !norm.is_finite() {
            return Err(RecommenderError::invalid_argument(
                "cannot normalize a zero or non-finite vector",
            ));
        }
        for x in &mut self.data {
            *x /= norm;
        }
        Ok(())
    }

    /// Unit-length copy of the vector
    pub fn normalized(&self) -> Result<Vector> {
        let mut v = self.clone();
        v.normalize()?;
        Ok(v)
    }
}
