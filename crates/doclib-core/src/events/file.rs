//! File repository domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to file items, versions, and assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FileEvent {
    /// A file item was created.
    ItemCreated {
        /// The file item ID.
        file_item_id: Uuid,
        /// The section it was filed under.
        section_id: Uuid,
        /// The category it was filed under.
        category_id: Uuid,
    },
    /// A new version was created under an existing item.
    VersionCreated {
        /// The file item ID.
        file_item_id: Uuid,
        /// The new version ID.
        version_id: Uuid,
        /// The assigned version number.
        version_number: i32,
    },
    /// An asset was uploaded to a version.
    AssetUploaded {
        /// The file item ID.
        file_item_id: Uuid,
        /// The version the asset belongs to.
        version_id: Uuid,
        /// The asset language.
        lang: String,
        /// The asset size in bytes.
        size_bytes: i64,
    },
    /// The current-version pointer was moved.
    CurrentVersionChanged {
        /// The file item ID.
        file_item_id: Uuid,
        /// The new current version ID.
        version_id: Uuid,
    },
    /// A version was soft-deleted.
    VersionDeleted {
        /// The file item ID.
        file_item_id: Uuid,
        /// The deleted version ID.
        version_id: Uuid,
    },
    /// A file item was soft-deleted (moved to trash).
    ItemDeleted {
        /// The file item ID.
        file_item_id: Uuid,
    },
    /// A file item was restored from trash.
    ItemRestored {
        /// The file item ID.
        file_item_id: Uuid,
    },
    /// An entity was irreversibly removed.
    ForceDeleted {
        /// The file item ID the removal was scoped to.
        file_item_id: Uuid,
        /// What was removed: `"file_item"`, `"file_version"`, or `"file_version_asset"`.
        entity: String,
    },
    /// Translations were replaced.
    TranslationsUpdated {
        /// The file item ID.
        file_item_id: Uuid,
        /// Languages in the new translation set.
        langs: Vec<String>,
    },
    /// Access type or allow-lists were replaced.
    AccessUpdated {
        /// The file item ID.
        file_item_id: Uuid,
    },
}

impl FileEvent {
    /// Dotted action name for the audit log.
    pub fn action(&self) -> &'static str {
        match self {
            Self::ItemCreated { .. } => "file.create",
            Self::VersionCreated { .. } => "file.version.create",
            Self::AssetUploaded { .. } => "file.asset.upload",
            Self::CurrentVersionChanged { .. } => "file.version.set_current",
            Self::VersionDeleted { .. } => "file.version.delete",
            Self::ItemDeleted { .. } => "file.delete",
            Self::ItemRestored { .. } => "file.restore",
            Self::ForceDeleted { .. } => "file.force_delete",
            Self::TranslationsUpdated { .. } => "file.translations.update",
            Self::AccessUpdated { .. } => "file.access.update",
        }
    }

    /// The file item this event concerns.
    pub fn entity_id(&self) -> Uuid {
        match self {
            Self::ItemCreated { file_item_id, .. }
            | Self::VersionCreated { file_item_id, .. }
            | Self::AssetUploaded { file_item_id, .. }
            | Self::CurrentVersionChanged { file_item_id, .. }
            | Self::VersionDeleted { file_item_id, .. }
            | Self::ItemDeleted { file_item_id }
            | Self::ItemRestored { file_item_id }
            | Self::ForceDeleted { file_item_id, .. }
            | Self::TranslationsUpdated { file_item_id, .. }
            | Self::AccessUpdated { file_item_id } => *file_item_id,
        }
    }
}
