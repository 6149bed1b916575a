//! Catalog metadata file: a JSON array of `{book_id, title, authors}` records.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::catalog::{BookRecord, Catalog};
use crate::error::Result;
use crate::persistence::serialization;

pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let records: Vec<BookRecord> = serialization::from_json(&bytes)?;
    let catalog = Catalog::from_records(records)?;
    info!(path = %path.display(), books = catalog.len(), "loaded catalog");
    Ok(catalog)
}

pub fn save_catalog(path: impl AsRef<Path>, records: &[BookRecord]) -> Result<()> {
    fs::write(path, serialization::to_json(&records)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.json");
        let records = vec![
            BookRecord {
                book_id: 0,
                title: "Emma".to_string(),
                authors: "Jane Austen".to_string(),
            },
            BookRecord {
                book_id: 1,
                title: "Persuasion".to_string(),
                authors: "Jane Austen".to_string(),
            },
        ];
        save_catalog(&path, &records).unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name_of(1).unwrap(), "Persuasion");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.json");
        fs::write(
            &path,
            r#"[{"book_id": 3, "title": "A", "authors": "x"},
                {"book_id": 3, "title": "B", "authors": "y"}]"#,
        )
        .unwrap();
        assert!(load_catalog(&path).unwrap_err().is_invalid_argument());
    }
}
