//! Query entry point: seed book in, ranked similar books out.

use std::sync::Arc;

use tracing::debug;

use crate::assembler::{assemble, Recommendation};
use crate::catalog::Catalog;
use crate::error::{Result, RecommenderError};
use crate::index::SimilarityIndex;
use crate::store::EmbeddingStore;

/// Owns handles to the loaded store, its index, and the catalog.
///
/// All three are immutable once built, so `recommend` takes `&self` and
/// concurrent callers need no locking.
#[derive(Debug)]
pub struct Recommender<I: SimilarityIndex> {
    store: Arc<EmbeddingStore>,
    index: Arc<I>,
    catalog: Arc<Catalog>,
}

impl<I: SimilarityIndex> Recommender<I> {
    /// Build the index over `store` and wire everything together.
    ///
    /// Fails with `IndexBuild` if the index cannot be constructed; no
    /// recommender exists until the build has succeeded.
    pub fn build(store: EmbeddingStore, catalog: Catalog, params: I::Params) -> Result<Self> {
        let index = I::build(&store, params)?;
        Self::new(Arc::new(store), Arc::new(index), Arc::new(catalog))
    }

    /// Assemble from parts built elsewhere. The index must cover `store`.
    pub fn new(store: Arc<EmbeddingStore>, index: Arc<I>, catalog: Arc<Catalog>) -> Result<Self> {
        if index.dimension() != store.dimension() {
            return Err(RecommenderError::DimensionMismatch {
                expected: store.dimension(),
                actual: index.dimension(),
            });
        }
        if index.len() != store.len() {
            return Err(RecommenderError::invalid_argument(format!(
                "index covers {} items but the store holds {}",
                index.len(),
                store.len()
            )));
        }
        Ok(Self {
            store,
            index,
            catalog,
        })
    }

    /// Up to `requested_count` books most similar to `seed_id`, nearest
    /// first, never including the seed itself.
    pub fn recommend(&self, seed_id: usize, requested_count: usize) -> Result<Vec<Recommendation>> {
        if requested_count == 0 {
            return Err(RecommenderError::invalid_argument(
                "requested count must be positive",
            ));
        }
        let seed = self.store.get(seed_id)?;

        // One extra hit to make room for the seed's own self-match
        let raw = self.index.query(seed, requested_count.saturating_add(1))?;
        let recommendations = assemble(seed_id, &raw, requested_count, &self.catalog)?;

        debug!(
            seed_id,
            requested_count,
            returned = recommendations.len(),
            "served recommendations"
        );
        Ok(recommendations)
    }

    /// Resolve `title` (exact, ignoring case) to a book id, then recommend.
    pub fn recommend_by_title(
        &self,
        title: &str,
        requested_count: usize,
    ) -> Result<(usize, Vec<Recommendation>)> {
        let seed_id = self
            .catalog
            .id_for_title(title)
            .ok_or_else(|| RecommenderError::NotFound {
                what: "title",
                id: title.to_string(),
            })?;
        Ok((seed_id, self.recommend(seed_id, requested_count)?))
    }

    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
