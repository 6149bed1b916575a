//! # Book Recommender
//!
//! Item-to-item book recommendations by nearest-neighbor search over
//! precomputed embeddings.
//!
//! This library provides:
//! - An immutable embedding store addressed by dense item id
//! - Exact and HNSW similarity indexes under cosine distance
//! - A catalog mapping item ids to titles and authors
//! - A recommender that excludes the seed book and ranks the rest
//! - Loaders for embedding snapshots and catalog files, plus an HTTP API
//!
//! ## Example
//!
//! ```rust
//! use book_recommender::{BookRecord, Catalog, EmbeddingStore, HnswIndex, HnswParams, Recommender};
//!
//! let store = EmbeddingStore::from_rows(vec![
//!     vec![1.0, 0.0],
//!     vec![0.9, 0.1],
//!     vec![0.0, 1.0],
//! ]).unwrap();
//! let catalog = Catalog::from_records((0..3).map(|id| BookRecord {
//!     book_id: id,
//!     title: format!("Book {}", id),
//!     authors: "Anonymous".to_string(),
//! })).unwrap();
//!
//! let recommender: Recommender<HnswIndex> =
//!     Recommender::build(store, catalog, HnswParams::default()).unwrap();
//! let recs = recommender.recommend(0, 1).unwrap();
//! assert_eq!(recs[0].item_id, 1);
//! ```

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod distance;
pub mod error;
pub mod flat_index;
pub mod hnsw;
pub mod index;
pub mod metrics;
pub mod persistence;
pub mod recommender;
pub mod server;
pub mod store;
pub mod vector;

pub use assembler::{assemble, Recommendation};
pub use catalog::{BookInfo, BookRecord, Catalog};
pub use config::{Config, IndexConfig, IndexKind};
pub use error::{RecommenderError, Result};
pub use flat_index::FlatIndex;
pub use hnsw::{HnswIndex, HnswParams};
pub use index::{AnyIndex, SimilarityIndex};
pub use recommender::Recommender;
pub use store::EmbeddingStore;
pub use vector::Vector;
