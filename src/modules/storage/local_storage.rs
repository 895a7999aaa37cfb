//! Local filesystem blob store
//!
//! Provides save, read and delete by key inside a single uploads directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::config::StorageConfig;
use crate::core::error::AppError;

/// Blob store consumed by the attachments feature
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` under `key`, replacing any existing file
    async fn save(&self, key: &str, data: &[u8]) -> Result<(), AppError>;

    /// Read the whole file. A missing file is `NotFound`.
    async fn read(&self, key: &str) -> Result<Vec<u8>, AppError>;

    /// Remove the file. A missing file is `NotFound` and nothing is changed.
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// Blob store backed by a directory on the local filesystem
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create the store, creating the uploads directory if needed
    pub async fn new(config: &StorageConfig) -> Result<Self, AppError> {
        Self::with_root(config.uploads_dir.clone()).await
    }

    pub async fn with_root(root: PathBuf) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to create uploads directory '{}': {}",
                root.display(),
                e
            ))
        })?;

        info!("Local file storage initialized at {}", root.display());
        Ok(Self { root })
    }

    /// Resolve a key inside the root. Keys are single path segments.
    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && Path::new(key).file_name().is_some();

        if !valid {
            return Err(AppError::BadRequest(format!("Invalid storage key '{}'", key)));
        }

        Ok(self.root.join(key))
    }
}

fn missing(key: &str) -> AppError {
    AppError::NotFound(format!("Stored file '{}' does not exist", key))
}

#[async_trait]
impl BlobStore for LocalFileStorage {
    async fn save(&self, key: &str, data: &[u8]) -> Result<(), AppError> {
        let path = self.path_for(key)?;

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file '{}': {}", key, e)))?;

        debug!("Saved file '{}' ({} bytes)", key, data.len());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.path_for(key)?;

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => missing(key),
            _ => AppError::Internal(format!("Failed to read file '{}': {}", key, e)),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;

        tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => missing(key),
            _ => AppError::Internal(format!("Failed to delete file '{}': {}", key, e)),
        })?;

        debug!("Deleted file '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, LocalFileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStorage::with_root(dir.path().join("uploads"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_read_delete() {
        let (_dir, store) = storage().await;

        store.save("quote.pdf", b"%PDF-1.7").await.unwrap();
        assert_eq!(store.read("quote.pdf").await.unwrap(), b"%PDF-1.7");

        store.delete("quote.pdf").await.unwrap();
        assert!(matches!(
            store.read("quote.pdf").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_not_found() {
        let (_dir, store) = storage().await;

        assert!(matches!(
            store.delete("gone.png").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_root() {
        let (_dir, store) = storage().await;

        for key in ["../secret", "a/b.txt", "..", "", "c\\d"] {
            assert!(
                matches!(store.save(key, b"x").await, Err(AppError::BadRequest(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }
}
