//! Loaders for the embedding snapshot and catalog files.

pub mod catalog_file;
pub mod embeddings;
pub mod serialization;

pub use catalog_file::{load_catalog, save_catalog};
pub use embeddings::{load_embeddings, save_embeddings};
