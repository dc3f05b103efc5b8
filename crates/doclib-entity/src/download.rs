//! Append-only download ledger entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One download event. Rows are never updated or deleted by the engine;
/// retention is an external concern.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DownloadEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// The downloading user; NULL for anonymous public downloads.
    pub user_id: Option<Uuid>,
    /// The file item that was downloaded.
    pub file_item_id: Uuid,
    /// The downloaded version.
    pub version_id: Uuid,
    /// The downloaded asset.
    pub asset_id: Uuid,
    /// The asset language.
    pub lang: String,
    /// When the download happened.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a download event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDownloadEvent {
    /// The downloading user, if authenticated.
    pub user_id: Option<Uuid>,
    /// The file item.
    pub file_item_id: Uuid,
    /// The version.
    pub version_id: Uuid,
    /// The asset.
    pub asset_id: Uuid,
    /// The asset language.
    pub lang: String,
}
