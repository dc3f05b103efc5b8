//! Department/category tree domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to the department and category trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HierarchyEvent {
    /// A node was created.
    NodeCreated {
        /// `"department"` or `"category"`.
        tree: String,
        /// The new node ID.
        node_id: Uuid,
        /// The parent node, if any.
        parent_id: Option<Uuid>,
    },
    /// A node was re-parented.
    NodeMoved {
        /// `"department"` or `"category"`.
        tree: String,
        /// The moved node ID.
        node_id: Uuid,
        /// The new parent node, if any.
        new_parent_id: Option<Uuid>,
    },
    /// A node was deleted.
    NodeDeleted {
        /// `"department"` or `"category"`.
        tree: String,
        /// The deleted node ID.
        node_id: Uuid,
    },
}

impl HierarchyEvent {
    /// Dotted action name for the audit log.
    pub fn action(&self) -> &'static str {
        match self {
            Self::NodeCreated { .. } => "hierarchy.create",
            Self::NodeMoved { .. } => "hierarchy.move",
            Self::NodeDeleted { .. } => "hierarchy.delete",
        }
    }

    /// Whether this concerns the department or category tree.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::NodeCreated { tree, .. }
            | Self::NodeMoved { tree, .. }
            | Self::NodeDeleted { tree, .. } => {
                if tree == "department" {
                    "department"
                } else {
                    "category"
                }
            }
        }
    }

    /// The node this event concerns.
    pub fn entity_id(&self) -> Uuid {
        match self {
            Self::NodeCreated { node_id, .. }
            | Self::NodeMoved { node_id, .. }
            | Self::NodeDeleted { node_id, .. } => *node_id,
        }
    }
}
