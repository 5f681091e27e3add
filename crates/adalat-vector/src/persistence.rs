//! Saving and loading an index together with its payloads.
//!
//! Two files are written into the target directory:
//! - `index.json` - dimensions and vectors
//! - `payloads.json` - caller payloads, one per vector, in position order
//!
//! Each file is written to a `.tmp` sibling and renamed into place, so a
//! reader never sees a partially written file.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::index::FlatIndex;

/// File name of the serialized index.
pub const INDEX_FILE: &str = "index.json";
/// File name of the serialized payload list.
pub const PAYLOADS_FILE: &str = "payloads.json";

/// Write `index` and `payloads` into `dir`, creating it if needed.
pub async fn save<T: Serialize>(dir: &Path, index: &FlatIndex, payloads: &[T]) -> Result<()> {
    if payloads.len() != index.len() {
        return Err(Error::Persistence(format!(
            "payload count {} does not match vector count {}",
            payloads.len(),
            index.len()
        )));
    }

    tokio::fs::create_dir_all(dir).await?;

    let index_json = serde_json::to_string(index)
        .map_err(|e| Error::Persistence(format!("Failed to serialize index: {}", e)))?;
    write_atomic(&dir.join(INDEX_FILE), index_json.as_bytes()).await?;

    let payloads_json = serde_json::to_string(payloads)
        .map_err(|e| Error::Persistence(format!("Failed to serialize payloads: {}", e)))?;
    write_atomic(&dir.join(PAYLOADS_FILE), payloads_json.as_bytes()).await?;

    info!(path = ?dir, vectors = index.len(), dimensions = index.dimensions(), "Saved index");
    Ok(())
}

/// Replace `path` with `contents` via a temporary file and a rename.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Read an index and its payloads from `dir`.
///
/// Returns `Ok(None)` when no index has been saved there.
pub async fn load<T: DeserializeOwned>(dir: &Path) -> Result<Option<(FlatIndex, Vec<T>)>> {
    let index_path = dir.join(INDEX_FILE);
    if !tokio::fs::try_exists(&index_path).await? {
        debug!(path = ?dir, "No saved index found");
        return Ok(None);
    }

    let index_bytes = tokio::fs::read(&index_path).await?;
    let index: FlatIndex = serde_json::from_slice(&index_bytes)
        .map_err(|e| Error::Persistence(format!("Failed to parse {}: {}", INDEX_FILE, e)))?;

    let payloads_path = dir.join(PAYLOADS_FILE);
    let payload_bytes = tokio::fs::read(&payloads_path).await.map_err(|e| {
        Error::Persistence(format!("Failed to read {}: {}", PAYLOADS_FILE, e))
    })?;
    let payloads: Vec<T> = serde_json::from_slice(&payload_bytes)
        .map_err(|e| Error::Persistence(format!("Failed to parse {}: {}", PAYLOADS_FILE, e)))?;

    if payloads.len() != index.len() {
        return Err(Error::Persistence(format!(
            "payload count {} does not match vector count {}",
            payloads.len(),
            index.len()
        )));
    }

    info!(path = ?dir, vectors = index.len(), "Loaded index");
    Ok(Some((index, payloads)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> (FlatIndex, Vec<String>) {
        let mut index = FlatIndex::new(2);
        index.add(vec![1.0, 0.0]).unwrap();
        index.add(vec![0.0, 1.0]).unwrap();
        (index, vec!["a".to_string(), "b".to_string()])
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let (index, payloads) = sample();
        save(dir.path(), &index, &payloads).await.unwrap();

        let (loaded, loaded_payloads): (FlatIndex, Vec<String>) =
            load(dir.path()).await.unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimensions(), 2);
        assert_eq!(loaded_payloads, payloads);
        assert_eq!(loaded.search(&[0.0, 1.0], 1).unwrap()[0].0, 1);
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = load::<String>(&dir.path().join("nothing")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_payload_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let (index, _) = sample();
        save(dir.path(), &index, &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        tokio::fs::write(dir.path().join(PAYLOADS_FILE), r#"["only-one"]"#)
            .await
            .unwrap();

        let err = load::<String>(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[tokio::test]
    async fn test_corrupt_index() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join(INDEX_FILE), "not json")
            .await
            .unwrap();
        assert!(matches!(
            load::<String>(dir.path()).await,
            Err(Error::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_save_replaces_files_without_leftovers() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join(INDEX_FILE), "{truncated")
            .await
            .unwrap();

        let (index, payloads) = sample();
        save(dir.path(), &index, &payloads).await.unwrap();

        let loaded = load::<String>(dir.path()).await.unwrap().unwrap();
        assert_eq!(loaded.1, payloads);
        assert!(!dir.path().join("index.json.tmp").exists());
        assert!(!dir.path().join("payloads.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_rejects_mismatch() {
        let dir = TempDir::new().unwrap();
        let (index, _) = sample();
        assert!(save(dir.path(), &index, &["x".to_string()]).await.is_err());
    }
}
