//! Blob storage trait for the physical asset payloads.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// Handle returned by [`BlobStore::put`]. The file repository persists
/// only this handle, never the raw bytes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredBlob {
    /// Path within the blob store.
    pub path: String,
    /// SHA-256 checksum of the stored content, hex-encoded.
    pub checksum_sha256: String,
    /// Size in bytes.
    pub size_bytes: i64,
}

/// A byte stream type used for reading blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends.
///
/// `put` must be write-then-commit: a failed or timed-out write leaves
/// no readable blob behind.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Store a payload and return its handle.
    async fn put(&self, data: Bytes) -> AppResult<StoredBlob>;

    /// Read a blob and return its byte stream.
    async fn get(&self, path: &str) -> AppResult<ByteStream>;

    /// Read a blob into memory as a complete byte vector.
    async fn get_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Delete a blob. Deleting a missing path is not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether a blob exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
