//! Book catalog: item id to display metadata.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RecommenderError};

/// One row of catalog metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub book_id: usize,
    pub title: String,
    pub authors: String,
}

/// Display fields for a single book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInfo {
    pub title: String,
    pub authors: String,
}

/// Read-only id → (title, authors) lookup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: HashMap<usize, BookInfo>,
}

impl Catalog {
    /// Build from catalog rows. Duplicate ids are rejected.
    pub fn from_records(records: impl IntoIterator<Item = BookRecord>) -> Result<Self> {
        let mut books = HashMap::new();
        for record in records {
            let info = BookInfo {
                title: record.title,
                authors: record.authors,
            };
            if books.insert(record.book_id, info).is_some() {
                return Err(RecommenderError::invalid_argument(format!(
                    "duplicate book id {} in catalog",
                    record.book_id
                )));
            }
        }
        Ok(Self { books })
    }

    pub fn get(&self, book_id: usize) -> Result<&BookInfo> {
        self.books
            .get(&book_id)
            .ok_or_else(|| RecommenderError::book_not_found(book_id))
    }

    pub fn name_of(&self, book_id: usize) -> Result<&str> {
        self.get(book_id).map(|b| b.title.as_str())
    }

    pub fn author_of(&self, book_id: usize) -> Result<&str> {
        self.get(book_id).map(|b| b.authors.as_str())
    }

    /// Books whose title contains `fragment`, ignoring case, ordered by id.
    /// An empty fragment matches every book.
    pub fn find_by_title(&self, fragment: &str) -> Vec<(usize, &BookInfo)> {
        let needle = fragment.to_lowercase();
        let mut matches: Vec<(usize, &BookInfo)> = self
            .books
            .iter()
            .filter(|(_, b)| b.title.to_lowercase().contains(&needle))
            .map(|(&id, b)| (id, b))
            .collect();
        matches.sort_by_key(|(id, _)| *id);
        matches
    }

    /// Lowest id whose title equals `title`, ignoring case.
    pub fn id_for_title(&self, title: &str) -> Option<usize> {
        let wanted = title.to_lowercase();
        self.books
            .iter()
            .filter(|(_, b)| b.title.to_lowercase() == wanted)
            .map(|(&id, _)| id)
            .min()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
