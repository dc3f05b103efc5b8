//! Local filesystem blob store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

use doclib_core::config::StorageConfig;
use doclib_core::error::{AppError, ErrorKind};
use doclib_core::result::AppResult;
use doclib_core::traits::storage::{BlobStore, ByteStream, StoredBlob};

/// Blob store backed by a directory on the local filesystem.
///
/// Blobs are content-addressed by a random UUID and sharded two levels
/// deep to keep directory fanout bounded. Writes go to a staging area
/// first and are renamed into place, so a crashed or timed-out upload
/// never leaves a readable blob behind.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
    /// Upper bound on a single payload, in bytes.
    max_size_bytes: u64,
}

impl LocalBlobStore {
    /// Create a blob store rooted at the configured path, creating the
    /// root and staging directories if needed.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let root = PathBuf::from(&config.root_path);
        fs::create_dir_all(root.join("_staging")).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            max_size_bytes: config.max_upload_size_bytes,
        })
    }

    /// Remove staging files older than `max_age` and return how many
    /// were removed.
    ///
    /// A canceled or timed-out upload leaves its partial file behind in
    /// the staging area; the embedding host runs this sweep on a timer.
    pub async fn sweep_staging(&self, max_age: Duration) -> AppResult<usize> {
        let staging = self.root.join("_staging");
        let mut entries = fs::read_dir(&staging).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read staging directory", e)
        })?;

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read staging directory", e)
        })? {
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            let age = metadata
                .modified()
                .ok()
                .and_then(|t| t.elapsed().ok())
                .unwrap_or_default();
            if age >= max_age && fs::remove_file(entry.path()).await.is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "Swept stale staging files");
        }
        Ok(removed)
    }

    /// Resolve a relative blob path to an absolute path within the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let clean = path.trim_start_matches('/');
        self.root.join(clean)
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

/// Sharded relative path for a blob ID, e.g. `"3f/a1/3fa1...-....bin"`.
fn sharded_path(id: Uuid) -> String {
    let hex = id.simple().to_string();
    format!("{}/{}/{hex}.bin", &hex[0..2], &hex[2..4])
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, data: Bytes) -> AppResult<StoredBlob> {
        if data.len() as u64 > self.max_size_bytes {
            return Err(AppError::validation(format!(
                "Payload of {} bytes exceeds the {} byte limit",
                data.len(),
                self.max_size_bytes
            )));
        }

        let id = Uuid::new_v4();
        let rel_path = sharded_path(id);
        let final_path = self.resolve(&rel_path);
        let staging_path = self.root.join("_staging").join(id.simple().to_string());

        let mut file = fs::File::create(&staging_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create staging file", e)
        })?;
        if let Err(e) = async {
            file.write_all(&data).await?;
            file.flush().await
        }
        .await
        {
            // Best effort: the staging file is garbage either way.
            let _ = fs::remove_file(&staging_path).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                "Failed to write staging file",
                e,
            ));
        }

        self.ensure_parent(&final_path).await?;
        fs::rename(&staging_path, &final_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to commit blob", e)
        })?;

        let checksum = format!("{:x}", Sha256::digest(&data));
        debug!(path = %rel_path, bytes = data.len(), "Stored blob");
        Ok(StoredBlob {
            path: rel_path,
            checksum_sha256: checksum,
            size_bytes: data.len() as i64,
        })
    }

    async fn get(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path);
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open blob: {path}"),
                    e,
                )
            }
        })?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(|b| b.into()))))
    }

    async fn get_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read blob: {path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path);
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {path}"),
                e,
            )),
        }
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.resolve(path).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &tempfile::TempDir) -> StorageConfig {
        StorageConfig {
            root_path: dir.path().to_str().unwrap().to_string(),
            max_upload_size_bytes: 1024,
            upload_timeout_seconds: 30,
        }
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(&test_config(&dir)).await.unwrap();

        let data = Bytes::from("hello world");
        let blob = store.put(data.clone()).await.unwrap();
        assert_eq!(blob.size_bytes, 11);
        assert!(store.exists(&blob.path).await.unwrap());

        let read_back = store.get_bytes(&blob.path).await.unwrap();
        assert_eq!(read_back, data);

        store.delete(&blob.path).await.unwrap();
        assert!(!store.exists(&blob.path).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_computes_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(&test_config(&dir)).await.unwrap();

        let blob = store.put(Bytes::from("abc")).await.unwrap();
        assert_eq!(
            blob.checksum_sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_put_rejects_oversized_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(&test_config(&dir)).await.unwrap();

        let err = store.put(Bytes::from(vec![0u8; 2048])).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(&test_config(&dir)).await.unwrap();

        store.delete("aa/bb/missing.bin").await.unwrap();
    }

    #[tokio::test]
    async fn test_sweep_staging_removes_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(&test_config(&dir)).await.unwrap();

        let stale = dir.path().join("_staging").join("abandoned");
        tokio::fs::write(&stale, b"partial").await.unwrap();

        // A generous age spares the fresh file.
        let removed = store.sweep_staging(Duration::from_secs(3600)).await.unwrap();
        assert_eq!(removed, 0);
        assert!(stale.exists());

        // A zero age collects everything.
        let removed = store.sweep_staging(Duration::ZERO).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_no_staging_leftovers_after_put() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(&test_config(&dir)).await.unwrap();

        store.put(Bytes::from("payload")).await.unwrap();

        let mut staging = tokio::fs::read_dir(dir.path().join("_staging")).await.unwrap();
        assert!(staging.next_entry().await.unwrap().is_none());
    }
}
