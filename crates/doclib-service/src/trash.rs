//! Soft delete, restore, and irreversible removal.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use doclib_core::error::AppError;
use doclib_core::events::{EventPayload, FileEvent};
use doclib_core::result::AppResult;
use doclib_core::types::pagination::{PageRequest, PageResponse};
use doclib_database::repositories::FileItemRepository;
use doclib_entity::access::Actor;
use doclib_entity::file::{FileItem, FileVersion};
use doclib_storage::BlobReclaimer;

use crate::dispatch::EventDispatcher;

/// Trash lifecycle: soft delete file items, restore them, and
/// force-delete already-trashed rows with asynchronous blob reclamation.
#[derive(Debug, Clone)]
pub struct TrashService {
    /// File repository.
    files: Arc<FileItemRepository>,
    /// Tolerant blob reclamation for force deletes.
    reclaimer: BlobReclaimer,
    /// Audit dispatch.
    events: EventDispatcher,
}

impl TrashService {
    /// Create a new trash service.
    pub fn new(
        files: Arc<FileItemRepository>,
        reclaimer: BlobReclaimer,
        events: EventDispatcher,
    ) -> Self {
        Self {
            files,
            reclaimer,
            events,
        }
    }

    /// Move a file item to the trash. Versions, assets, favorites, and
    /// the download ledger stay untouched.
    pub async fn delete_file_item(&self, actor: &Actor, id: Uuid) -> AppResult<FileItem> {
        let item = self.files.soft_delete_item(id).await?;

        info!(file_item_id = %id, actor_id = %actor.user_id, "File item deleted");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::ItemDeleted { file_item_id: id }),
        );
        Ok(item)
    }

    /// Restore a trashed file item. If its current-version pointer
    /// references a version that stayed deleted, the pointer is nulled.
    pub async fn restore_file_item(&self, actor: &Actor, id: Uuid) -> AppResult<FileItem> {
        let item = self.files.restore_item(id).await?;

        info!(file_item_id = %id, actor_id = %actor.user_id, "File item restored");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::ItemRestored { file_item_id: id }),
        );
        Ok(item)
    }

    /// List trashed items. Requires the trash-read privilege.
    pub async fn list_trash(
        &self,
        actor: &Actor,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileItem>> {
        if !actor.can_read_trash() {
            return Err(AppError::forbidden("You may not view the trash"));
        }
        self.files.find_trash(page).await
    }

    /// Irreversibly remove a trashed item with everything it owns. The
    /// asset blobs are reclaimed on a background task.
    pub async fn force_delete_item(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let paths = self.files.force_delete_item(id).await?;
        let blob_count = paths.len();
        self.reclaimer.reclaim_detached(paths);

        info!(file_item_id = %id, blobs = blob_count, "File item force-deleted");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::ForceDeleted {
                file_item_id: id,
                entity: "file_item".to_string(),
            }),
        );
        Ok(())
    }

    /// Irreversibly remove a trashed version and its assets.
    pub async fn force_delete_version(&self, actor: &Actor, version_id: Uuid) -> AppResult<()> {
        let version: FileVersion = self
            .files
            .find_version(version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;

        let paths = self.files.force_delete_version(version_id).await?;
        self.reclaimer.reclaim_detached(paths);

        info!(version_id = %version_id, "Version force-deleted");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::ForceDeleted {
                file_item_id: version.file_item_id,
                entity: "file_version".to_string(),
            }),
        );
        Ok(())
    }

    /// Irreversibly remove a single trashed asset.
    pub async fn force_delete_asset(&self, actor: &Actor, asset_id: Uuid) -> AppResult<()> {
        let asset = self
            .files
            .find_asset(asset_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {asset_id} not found")))?;
        let version = self
            .files
            .find_version(asset.version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {} not found", asset.version_id)))?;

        let path = self.files.force_delete_asset(asset_id).await?;
        self.reclaimer.reclaim_detached(vec![path]);

        info!(asset_id = %asset_id, "Asset force-deleted");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::ForceDeleted {
                file_item_id: version.file_item_id,
                entity: "file_version_asset".to_string(),
            }),
        );
        Ok(())
    }
}
