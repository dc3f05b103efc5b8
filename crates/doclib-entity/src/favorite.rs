//! Per-user bookmark entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bookmark on a file item, keyed by (file_item_id, user_id).
///
/// Adding and removing are both idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Favorite {
    /// The bookmarked file item.
    pub file_item_id: Uuid,
    /// The bookmarking user.
    pub user_id: Uuid,
    /// When the bookmark was created.
    pub created_at: DateTime<Utc>,
}
