//! Runtime configuration, optionally read from a JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RecommenderError};
use crate::hnsw::HnswParams;

/// Which similarity backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    #[default]
    Hnsw,
    Flat,
}

/// Index selection plus HNSW tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub kind: IndexKind,
    pub hnsw: HnswParams,
}

/// Top-level configuration for the CLI and HTTP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    /// Recommendations returned when a request does not name a count.
    pub default_count: usize,
    /// Address the HTTP server binds to.
    pub server_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            default_count: 10,
            server_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        let config: Config = serde_json::from_slice(&bytes)
            .map_err(|e| RecommenderError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_count == 0 {
            return Err(RecommenderError::invalid_argument(
                "default_count must be positive",
            ));
        }
        if self.index.kind == IndexKind::Hnsw {
            self.index
                .hnsw
                .validate()
                .map_err(|e| RecommenderError::invalid_argument(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.index.kind, IndexKind::Hnsw);
        assert_eq!(config.index.hnsw.m, 16);
        assert_eq!(config.default_count, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"index": {{"kind": "flat"}}, "default_count": 5}}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.index.kind, IndexKind::Flat);
        assert_eq!(config.default_count, 5);
        assert_eq!(config.server_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_count": 0}}"#).unwrap();
        assert!(Config::from_file(file.path()).unwrap_err().is_invalid_argument());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"index": {{"hnsw": {{"m": 1}}}}}}"#).unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(RecommenderError::Serialization(_))
        ));
    }
}
