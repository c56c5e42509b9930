//! File storage for uploaded documents (soil sample lab reports).
//!
//! The storage collaborator is object-storage shaped: callers upload bytes to
//! a path and get back a public URL string, which is all the registry persists
//! as a foreign reference. The trait abstracts over filesystem, S3, or other
//! providers; the filesystem backend is what deployments run today, fronted by
//! a static file server at `public_base_url`.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use murimi_core::{Error, Result};

/// Storage backend trait for different storage implementations.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data at the given path and return its public URL.
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String>;

    /// Delete data at the specified path.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Public URL for a stored path.
    fn public_url(&self, path: &str) -> String;
}

/// Filesystem storage backend.
///
/// Stores files under a base directory and derives public URLs by joining the
/// path onto `public_base_url`.
pub struct FilesystemBackend {
    base_path: PathBuf,
    public_base_url: String,
}

impl FilesystemBackend {
    /// Create a new filesystem backend.
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    /// Validate that the storage backend can write, read, and delete files.
    ///
    /// Performs a full round-trip test at startup to catch filesystem issues
    /// (permission errors, missing directories) early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await; // Best-effort cleanup

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        if path.is_empty() || path.split('/').any(|seg| seg == "..") {
            return Err(Error::Storage(format!("Invalid storage path: '{}'", path)));
        }

        let full_path = self.full_path(path);
        debug!(
            subsystem = "storage",
            component = "filesystem",
            op = "upload",
            storage_path = %path,
            size = data.len(),
            "Writing stored file"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "storage: create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "storage: File::create failed");
            e
        })?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "storage: rename failed");
            e
        })?;

        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path);
        if fs::try_exists(&full_path).await? {
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.full_path(path);
        Ok(fs::try_exists(full_path).await?)
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_returns_public_url_and_persists_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path(), "https://files.example.org/");

        let url = backend
            .upload("soil-reports/abc/report.pdf", b"report bytes")
            .await
            .unwrap();
        assert_eq!(url, "https://files.example.org/soil-reports/abc/report.pdf");

        let stored = fs::read(dir.path().join("soil-reports/abc/report.pdf"))
            .await
            .unwrap();
        assert_eq!(stored, b"report bytes");
    }

    #[tokio::test]
    async fn test_upload_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path(), "https://files.example.org");

        let err = backend.upload("../escape.bin", b"x").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path(), "https://files.example.org");

        backend.upload("a/b.bin", b"x").await.unwrap();
        assert!(backend.exists("a/b.bin").await.unwrap());

        backend.delete("a/b.bin").await.unwrap();
        assert!(!backend.exists("a/b.bin").await.unwrap());

        // Deleting a missing path is not an error.
        backend.delete("a/b.bin").await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path(), "https://files.example.org");
        backend.validate().await.unwrap();
    }
}
