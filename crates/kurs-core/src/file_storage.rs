//! File storage abstraction layer.
//!
//! Uploaded avatars are stored through the [`FileStorage`] trait so the
//! backend (local filesystem in production, memory in tests) can be swapped
//! without touching the handlers.
//!
//! # Example
//!
//! ```ignore
//! use kurs_core::file_storage::{FileStorage, LocalFileStorage};
//! use std::path::PathBuf;
//!
//! let storage = LocalFileStorage::new(PathBuf::from("./uploads"), 3 * 1024 * 1024);
//!
//! let key = storage.save("1700000000000-avatar.png", &bytes).await?;
//! storage.delete(&key).await?;
//! ```

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;

/// Abstract trait for file storage backends.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Save file content under `key` and return the key.
    async fn save(&self, key: &str, content: &[u8]) -> Result<String, StorageError>;

    /// Delete a file by key. Missing files are not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File exceeds maximum size of {max_bytes} bytes")]
    InvalidFileSize { max_bytes: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Rejects empty keys, path traversal, absolute paths and anything outside
/// `[A-Za-z0-9._-/]`.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
        return Err(StorageError::InvalidKey(
            "Key must not be empty, contain '..', or start with a separator".to_string(),
        ));
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
    {
        return Err(StorageError::InvalidKey(
            "Key contains invalid characters".to_string(),
        ));
    }

    Ok(())
}

/// Stores files in a directory on the local filesystem. The directory is
/// served statically by the router.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, max_file_size: usize) -> Self {
        Self {
            base_dir,
            max_file_size,
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, key: &str, content: &[u8]) -> Result<String, StorageError> {
        validate_key(key)?;

        if content.len() > self.max_file_size {
            return Err(StorageError::InvalidFileSize {
                max_bytes: self.max_file_size,
            });
        }

        let file_path = self.base_dir.join(key);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&file_path, content).await?;

        Ok(key.to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        match fs::remove_file(self.base_dir.join(key)).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> (LocalFileStorage, PathBuf) {
        let dir = std::env::temp_dir().join(format!("kurs-storage-{}", uuid::Uuid::new_v4()));
        let storage = LocalFileStorage::new(dir.clone(), 16);
        (storage, dir)
    }

    #[test]
    fn test_validate_key_accepts_generated_names() {
        assert!(validate_key("1700000000000-avatar.png").is_ok());
        assert!(validate_key("avatars/ali_1.webp").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_path_traversal() {
        assert!(validate_key("../../../etc/passwd").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("\\windows\\system32").is_err());
        assert!(validate_key("").is_err());
    }

    #[tokio::test]
    async fn test_save_and_delete_roundtrip_on_disk() {
        let (storage, dir) = temp_storage();

        let key = storage.save("1-a.png", b"png-bytes").await.unwrap();
        assert_eq!(std::fs::read(dir.join(&key)).unwrap(), b"png-bytes");

        storage.delete(&key).await.unwrap();
        assert!(!dir.join(&key).exists());

        // Deleting again is a no-op.
        storage.delete(&key).await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_content() {
        let (storage, _dir) = temp_storage();
        let err = storage.save("big.png", &[0u8; 17]).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidFileSize { max_bytes: 16 }));
    }
}
