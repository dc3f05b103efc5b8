//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable numbered snapshot of a file item's content.
///
/// Version numbers are assigned as max+1 per item and never reused or
/// renumbered, even after deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The file item this version belongs to.
    pub file_item_id: Uuid,
    /// Sequential version number, unique per item.
    pub version_number: i32,
    /// Optional comment describing the change.
    pub comment: Option<String>,
    /// User who created this version.
    pub created_by: Uuid,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
    /// Soft-delete timestamp; a deleted version can never be current.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FileVersion {
    /// Whether the version is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
