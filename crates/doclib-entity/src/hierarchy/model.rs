//! Department and category entity models.
//!
//! Both are self-referencing adjacency trees with a cached depth column
//! (1 for roots, parent depth + 1 otherwise). Depth is recomputed for the
//! whole subtree on every re-parent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An organizational department. Deleting a department cascades to its
/// child departments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    /// Unique department identifier.
    pub id: Uuid,
    /// Parent department; NULL for roots.
    pub parent_id: Option<Uuid>,
    /// Cached tree depth, 1 for roots.
    pub depth: i32,
    /// Department name.
    pub name: String,
    /// When the department was created.
    pub created_at: DateTime<Utc>,
    /// When the department was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A document category, scoped to a section. Deleting a category detaches
/// its children (parent set NULL, children promoted to roots).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Unique category identifier.
    pub id: Uuid,
    /// The section this category belongs to.
    pub section_id: Uuid,
    /// Parent category; NULL for roots.
    pub parent_id: Option<Uuid>,
    /// Cached tree depth, 1 for roots.
    pub depth: i32,
    /// Default-language title; per-language titles live in
    /// `category_translations`.
    pub title: String,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}
