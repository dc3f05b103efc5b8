//! Publication request entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::access::AccessType;

use super::status::RequestStatus;

/// Whether a request proposes a brand-new item or a new version of an
/// existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Proposes a new file item.
    New,
    /// Proposes a new version of the item referenced by `file_item_id`.
    Update,
}

impl RequestType {
    /// Return the request type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Update => "update",
        }
    }
}

/// A staging entity through which contributors propose new file items or
/// new versions, subject to moderation.
///
/// The request exclusively owns its staged translations and assets until
/// resolution; on approval they are moved (never copied) into the created
/// version.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileRequest {
    /// Unique request identifier.
    pub id: Uuid,
    /// Target section.
    pub section_id: Uuid,
    /// Target category.
    pub category_id: Uuid,
    /// Proposed access policy.
    pub access_type: AccessType,
    /// `new` or `update`.
    pub request_type: RequestType,
    /// The target file item; set only for `update` requests.
    pub file_item_id: Option<Uuid>,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Submitter's comment.
    pub comment: Option<String>,
    /// Approver's reason, set when rejected.
    pub rejection_reason: Option<String>,
    /// The submitting user.
    pub created_by: Uuid,
    /// The resolving approver (or the submitter, for cancellations).
    pub resolved_by: Option<Uuid>,
    /// When the request left the pending state.
    pub resolved_at: Option<DateTime<Utc>>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the request was last updated.
    pub updated_at: DateTime<Utc>,
}

impl FileRequest {
    /// Whether the request is still awaiting moderation.
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
