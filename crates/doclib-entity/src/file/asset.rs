//! File version asset entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The physical payload for one language of one version.
///
/// At most one asset per (version, lang). The row stores only the blob
/// store handle, never raw bytes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVersionAsset {
    /// Unique asset identifier.
    pub id: Uuid,
    /// The version this asset belongs to.
    pub version_id: Uuid,
    /// Language code (e.g., `"ru"`, `"en"`).
    pub lang: String,
    /// The file name as originally uploaded.
    pub original_name: String,
    /// MIME type of the payload.
    pub mime: Option<String>,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Path within the blob store.
    pub storage_path: String,
    /// SHA-256 checksum, hex-encoded.
    pub checksum_sha256: String,
    /// When the asset was uploaded.
    pub created_at: DateTime<Utc>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}
