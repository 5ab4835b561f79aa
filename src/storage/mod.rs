use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Disk-backed object store for delivered assets.
///
/// Keys are slash-separated relative paths; every segment is validated so a
/// key can never escape the root directory.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    root: PathBuf,
}

impl ObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config() -> Self {
        Self::new(&config::config().storage.asset_root)
    }

    /// Canonical key for an asset object.
    pub fn asset_key(client_id: Uuid, asset_id: Uuid) -> String {
        format!("assets/{}/{}", client_id, asset_id)
    }

    pub async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        Ok(())
    }

    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".to_string()));
        }

        let mut path = self.root.clone();
        for segment in key.split('/') {
            if !Self::is_valid_segment(segment) {
                return Err(StorageError::InvalidKey(key.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }

    fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ObjectStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = ObjectStorage::new(dir.path());
        (dir, storage)
    }

    #[tokio::test]
    async fn save_read_delete_roundtrip() {
        let (_dir, storage) = store();
        let key = ObjectStorage::asset_key(Uuid::new_v4(), Uuid::new_v4());

        storage.save(&key, b"png bytes").await.unwrap();
        assert_eq!(storage.read(&key).await.unwrap(), b"png bytes");

        storage.delete(&key).await.unwrap();
        assert!(matches!(
            storage.read(&key).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let (_dir, storage) = store();
        for key in ["../outside", "a//b", "", "a/../b", "a/b c"] {
            assert!(
                matches!(storage.save(key, b"x").await, Err(StorageError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[tokio::test]
    async fn delete_missing_object_reports_not_found() {
        let (_dir, storage) = store();
        assert!(matches!(
            storage.delete("assets/none").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
