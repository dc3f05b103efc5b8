//! Staged asset rows owned by a pending request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A payload staged against a pending request, one per language.
///
/// On approval the row's ownership is transferred into the created
/// version by re-pointing the foreign key; on rejection or cancellation
/// the underlying blob is reclaimed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequestAsset {
    /// Unique staged asset identifier.
    pub id: Uuid,
    /// The owning request.
    pub request_id: Uuid,
    /// Language code.
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
    /// When the asset was staged.
    pub created_at: DateTime<Utc>,
}
