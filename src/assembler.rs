//! Turns raw index hits into caller-ready recommendations.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::Result;

/// One recommended book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item_id: usize,
    pub name: String,
    pub author: String,
    pub distance: f32,
}

/// Drop the seed, keep at most `requested_count` hits, and attach display
/// metadata. Index order is preserved as-is.
///
/// The seed is expected first (a self-match at distance ~0), but an
/// approximate index may rank it elsewhere, so every occurrence is removed.
/// A hit with no catalog entry fails the whole call with `NotFound`.
pub fn assemble(
    seed_id: usize,
    raw_results: &[(usize, f32)],
    requested_count: usize,
    catalog: &Catalog,
) -> Result<Vec<Recommendation>> {
    raw_results
        .iter()
        .filter(|(item_id, _)| *item_id != seed_id)
        .take(requested_count)
        .map(|&(item_id, distance)| {
            let book = catalog.get(item_id)?;
            Ok(Recommendation {
                item_id,
                name: book.title.clone(),
                author: book.authors.clone(),
                distance,
            })
        })
        .collect()
}
