//! File item entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::access::AccessType;

/// The logical document entity, independent of any specific rendition.
///
/// Invariant: `current_version_id`, when set, references a non-deleted
/// version belonging to this item; at most one version per item is
/// current at a time. The pointer stays NULL until the first asset
/// upload against version #1 succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileItem {
    /// Unique file item identifier.
    pub id: Uuid,
    /// The section this item is filed under.
    pub section_id: Uuid,
    /// The category within the section.
    pub category_id: Uuid,
    /// Who may view and download this item.
    pub access_type: AccessType,
    /// The current version, once the item has downloadable content.
    pub current_version_id: Option<Uuid>,
    /// Whether non-current versions are downloadable by the same audience
    /// as the current one.
    pub allow_version_access: bool,
    /// The user who created the item.
    pub created_by: Uuid,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete timestamp; NULL means live.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FileItem {
    /// Whether the item is in the trash.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data required to create a new file item record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileItem {
    /// The section to file the item under.
    pub section_id: Uuid,
    /// The category within the section.
    pub category_id: Uuid,
    /// The access policy.
    pub access_type: AccessType,
    /// Whether non-current versions are downloadable.
    pub allow_version_access: bool,
    /// The creating user.
    pub created_by: Uuid,
}
