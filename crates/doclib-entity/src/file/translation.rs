//! Per-language translation rows.
//!
//! The same shape is used for file item translations, version translations,
//! and staged request translations; each lives in its own table keyed by
//! the owning entity, unique per (owner, lang).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One language rendition of an entity's title and description.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Translation {
    /// Unique translation identifier.
    pub id: Uuid,
    /// The owning entity (file item, version, or request).
    pub owner_id: Uuid,
    /// Language code.
    pub lang: String,
    /// Display title in this language.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// When the translation was created.
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied translation content, validated before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationInput {
    /// Language code.
    pub lang: String,
    /// Display title; must be non-empty.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
}

impl TranslationInput {
    /// Create a new translation input.
    pub fn new(lang: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            title: title.into(),
            description: None,
        }
    }
}
