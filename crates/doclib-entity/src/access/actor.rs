//! The acting identity supplied by the external auth collaborator.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capability string granting download access to restricted items
/// regardless of allow-list membership.
pub const PERM_DOWNLOAD_RESTRICTED: &str = "file.download.restricted";

/// Capability string granting visibility into soft-deleted (trashed)
/// items.
pub const PERM_TRASH_READ: &str = "file.trash.read";

/// The authenticated identity on whose behalf an operation runs.
///
/// Supplied for every call by the identity collaborator; the engine never
/// authenticates credentials itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user's ID.
    pub user_id: Uuid,
    /// The user's department, if assigned.
    pub department_id: Option<Uuid>,
    /// Resolved permission strings for this user.
    pub permissions: HashSet<String>,
    /// Role level (higher = more privileged), used only for display and
    /// coarse admin gates by callers.
    pub role_level: i32,
}

impl Actor {
    /// Create a new actor.
    pub fn new(user_id: Uuid, department_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            department_id,
            permissions: HashSet::new(),
            role_level: 0,
        }
    }

    /// Add a permission string (builder style).
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Whether the actor holds the given permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Whether the actor may see soft-deleted items.
    pub fn can_read_trash(&self) -> bool {
        self.has_permission(PERM_TRASH_READ)
    }
}
