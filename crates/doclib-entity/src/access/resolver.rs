//! Pure access resolution for file items and versions.
//!
//! These functions are deterministic and side-effect-free so they can be
//! used both to filter listings and to gate download endpoints. Allow-list
//! membership is tested against sets loaded once per request, not per-row
//! queries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::{Actor, PERM_DOWNLOAD_RESTRICTED};
use super::AccessType;
use crate::file::{FileItem, FileVersion};

/// The allow-lists of one file item (or one request), loaded as sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessLists {
    /// Departments permitted by the `restricted` and `department_closed`
    /// policies.
    pub departments: HashSet<Uuid>,
    /// Users permitted by the `restricted` policy.
    pub users: HashSet<Uuid>,
}

impl AccessLists {
    /// Build allow-lists from id iterators.
    pub fn new(
        departments: impl IntoIterator<Item = Uuid>,
        users: impl IntoIterator<Item = Uuid>,
    ) -> Self {
        Self {
            departments: departments.into_iter().collect(),
            users: users.into_iter().collect(),
        }
    }
}

/// Whether the actor may see the file item at all.
pub fn can_view(actor: &Actor, item: &FileItem, lists: &AccessLists) -> bool {
    if item.deleted_at.is_some() && !actor.can_read_trash() {
        return false;
    }
    match item.access_type {
        AccessType::Public => true,
        AccessType::Restricted => {
            in_department_list(actor, lists)
                || lists.users.contains(&actor.user_id)
                || actor.has_permission(PERM_DOWNLOAD_RESTRICTED)
        }
        // The user allow-list is not applicable to this mode.
        AccessType::DepartmentClosed => in_department_list(actor, lists),
    }
}

/// Whether the actor may download the given version of the file item.
///
/// Non-current versions are reachable only when the item opts in via
/// `allow_version_access`; the item-level access check applies either way.
pub fn can_download(
    actor: &Actor,
    item: &FileItem,
    version: &FileVersion,
    lists: &AccessLists,
) -> bool {
    if !can_view(actor, item, lists) {
        return false;
    }
    if version.deleted_at.is_some() && !actor.can_read_trash() {
        return false;
    }
    let is_current = item.current_version_id == Some(version.id);
    is_current || item.allow_version_access
}

fn in_department_list(actor: &Actor, lists: &AccessLists) -> bool {
    actor
        .department_id
        .map(|d| lists.departments.contains(&d))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(access_type: AccessType) -> FileItem {
        FileItem {
            id: Uuid::new_v4(),
            section_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            access_type,
            current_version_id: None,
            allow_version_access: false,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn version_of(item: &FileItem) -> FileVersion {
        FileVersion {
            id: Uuid::new_v4(),
            file_item_id: item.id,
            version_number: 1,
            comment: None,
            created_by: item.created_by,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_public_visible_to_anyone() {
        let actor = Actor::new(Uuid::new_v4(), None);
        assert!(can_view(&actor, &item(AccessType::Public), &AccessLists::default()));
    }

    #[test]
    fn test_public_deleted_hidden_without_trash_read() {
        let mut it = item(AccessType::Public);
        it.deleted_at = Some(Utc::now());
        let actor = Actor::new(Uuid::new_v4(), None);
        assert!(!can_view(&actor, &it, &AccessLists::default()));

        let janitor = Actor::new(Uuid::new_v4(), None).with_permission("file.trash.read");
        assert!(can_view(&janitor, &it, &AccessLists::default()));
    }

    #[test]
    fn test_restricted_by_department() {
        let dept = Uuid::new_v4();
        let lists = AccessLists::new([dept], []);
        let it = item(AccessType::Restricted);

        let member = Actor::new(Uuid::new_v4(), Some(dept));
        let outsider = Actor::new(Uuid::new_v4(), Some(Uuid::new_v4()));
        assert!(can_view(&member, &it, &lists));
        assert!(!can_view(&outsider, &it, &lists));
    }

    #[test]
    fn test_restricted_by_user_list() {
        let user = Uuid::new_v4();
        let lists = AccessLists::new([], [user]);
        let it = item(AccessType::Restricted);

        assert!(can_view(&Actor::new(user, None), &it, &lists));
        assert!(!can_view(&Actor::new(Uuid::new_v4(), None), &it, &lists));
    }

    #[test]
    fn test_restricted_capability_overrides_lists() {
        let it = item(AccessType::Restricted);
        let elevated =
            Actor::new(Uuid::new_v4(), None).with_permission(PERM_DOWNLOAD_RESTRICTED);
        assert!(can_view(&elevated, &it, &AccessLists::default()));

        // `file.read` alone grants nothing here.
        let reader = Actor::new(Uuid::new_v4(), None).with_permission("file.read");
        assert!(!can_view(&reader, &it, &AccessLists::default()));
    }

    #[test]
    fn test_department_closed_ignores_user_list() {
        let user = Uuid::new_v4();
        let lists = AccessLists::new([], [user]);
        let it = item(AccessType::DepartmentClosed);
        assert!(!can_view(&Actor::new(user, None), &it, &lists));

        let dept = Uuid::new_v4();
        let lists = AccessLists::new([dept], []);
        assert!(can_view(&Actor::new(user, Some(dept)), &it, &lists));
    }

    #[test]
    fn test_non_current_version_needs_opt_in() {
        let mut it = item(AccessType::Public);
        let current = version_of(&it);
        let old = version_of(&it);
        it.current_version_id = Some(current.id);

        let actor = Actor::new(Uuid::new_v4(), None);
        let lists = AccessLists::default();
        assert!(can_download(&actor, &it, &current, &lists));
        assert!(!can_download(&actor, &it, &old, &lists));

        it.allow_version_access = true;
        assert!(can_download(&actor, &it, &old, &lists));
    }

    #[test]
    fn test_version_access_still_requires_item_access() {
        let mut it = item(AccessType::DepartmentClosed);
        it.allow_version_access = true;
        let v = version_of(&it);
        let actor = Actor::new(Uuid::new_v4(), None);
        assert!(!can_download(&actor, &it, &v, &AccessLists::default()));
    }
}
