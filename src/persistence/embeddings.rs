//! Embedding snapshot files.
//!
//! Binary layout: `[magic: b"BKEM"][version: u32][len: u32][crc32: u32][payload]`
//! where the payload is `bincode(Vec<Vec<f32>>)`, one row per item id.
//! Files ending in `.json` are read as a plain array of arrays instead.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Result, RecommenderError};
use crate::persistence::serialization;
use crate::store::EmbeddingStore;

const MAGIC: &[u8; 4] = b"BKEM";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Write `store` as a binary snapshot.
pub fn save_embeddings(path: impl AsRef<Path>, store: &EmbeddingStore) -> Result<()> {
    let rows: Vec<&[f32]> = store.vectors().iter().map(|v| v.as_slice()).collect();
    let payload = serialization::to_bincode(&rows)?;
    let len = u32::try_from(payload.len()).map_err(|_| {
        RecommenderError::Serialization("embedding payload exceeds 4 GiB".to_string())
    })?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&len.to_le_bytes());
    bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    bytes.extend_from_slice(&payload);

    fs::write(path, bytes)?;
    Ok(())
}

/// Load an embedding store, choosing the format by file extension.
pub fn load_embeddings(path: impl AsRef<Path>) -> Result<EmbeddingStore> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    let rows: Vec<Vec<f32>> = if path.extension().is_some_and(|ext| ext == "json") {
        serialization::from_json(&bytes)?
    } else {
        decode_snapshot(&bytes)?
    };

    let store = EmbeddingStore::from_rows(rows)?;
    info!(
        path = %path.display(),
        items = store.len(),
        dimension = store.dimension(),
        "loaded embeddings"
    );
    Ok(store)
}

fn decode_snapshot(bytes: &[u8]) -> Result<Vec<Vec<f32>>> {
    if bytes.len() < HEADER_LEN {
        return Err(RecommenderError::CorruptSnapshot(
            "file shorter than header".to_string(),
        ));
    }
    if &bytes[0..4] != MAGIC {
        return Err(RecommenderError::CorruptSnapshot("bad magic".to_string()));
    }

    let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    let version = word(4);
    if version != VERSION {
        return Err(RecommenderError::CorruptSnapshot(format!(
            "unsupported version {}",
            version
        )));
    }
    let len = word(8) as usize;
    let expected_crc = word(12);

    let payload = &bytes[HEADER_LEN..];
    if payload.len() != len {
        return Err(RecommenderError::CorruptSnapshot(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            len
        )));
    }
    if crc32fast::hash(payload) != expected_crc {
        return Err(RecommenderError::CorruptSnapshot("checksum mismatch".to_string()));
    }

    serialization::from_bincode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> EmbeddingStore {
        EmbeddingStore::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        save_embeddings(&path, &store()).unwrap();

        let loaded = load_embeddings(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimension(), 3);
        assert_eq!(loaded.get(1).unwrap().as_slice(), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.json");
        fs::write(&path, "[[0.5, 1.5], [2.5, 3.5]]").unwrap();

        let loaded = load_embeddings(&path).unwrap();
        assert_eq!(loaded.get(0).unwrap().as_slice(), &[0.5, 1.5]);
    }

    #[test]
    fn test_flipped_byte_detected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        save_embeddings(&path, &store()).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            load_embeddings(&path),
            Err(RecommenderError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_truncated_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.bin");
        save_embeddings(&path, &store()).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();
        assert!(matches!(
            load_embeddings(&path),
            Err(RecommenderError::CorruptSnapshot(_))
        ));

        fs::write(&path, b"BKEM").unwrap();
        assert!(matches!(
            load_embeddings(&path),
            Err(RecommenderError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("embeddings.json");
        fs::write(&path, "[[1.0, 2.0], [3.0]]").unwrap();
        assert!(load_embeddings(&path).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_embeddings(dir.path().join("nope.bin")),
            Err(RecommenderError::Io(_))
        ));
    }
}
