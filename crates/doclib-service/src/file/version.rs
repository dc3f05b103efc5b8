//! Version and asset operations.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use doclib_core::config::StorageConfig;
use doclib_core::error::AppError;
use doclib_core::events::{EventPayload, FileEvent};
use doclib_core::result::AppResult;
use doclib_core::traits::storage::BlobStore;
use doclib_database::repositories::FileItemRepository;
use doclib_entity::access::Actor;
use doclib_entity::file::{FileItem, FileVersion, FileVersionAsset};

use crate::dispatch::EventDispatcher;

/// Manages versions under file items and the binary assets under
/// versions.
#[derive(Debug, Clone)]
pub struct VersionService {
    /// File repository.
    files: Arc<FileItemRepository>,
    /// Blob storage backend.
    blobs: Arc<dyn BlobStore>,
    /// Upper bound on one asset write.
    upload_timeout: Duration,
    /// Audit dispatch.
    events: EventDispatcher,
}

impl VersionService {
    /// Create a new version service.
    pub fn new(
        files: Arc<FileItemRepository>,
        blobs: Arc<dyn BlobStore>,
        storage: &StorageConfig,
        events: EventDispatcher,
    ) -> Self {
        Self {
            files,
            blobs,
            upload_timeout: Duration::from_secs(storage.upload_timeout_seconds),
            events,
        }
    }

    /// Create a new version numbered max+1 under an item. The new
    /// version does not become current until explicitly assigned or
    /// promoted by a first upload.
    pub async fn create_version(
        &self,
        actor: &Actor,
        file_item_id: Uuid,
        comment: Option<&str>,
    ) -> AppResult<FileVersion> {
        let version = self
            .files
            .create_version(file_item_id, comment, actor.user_id)
            .await?;

        info!(
            file_item_id = %file_item_id,
            version_id = %version.id,
            version_number = version.version_number,
            "Version created"
        );
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::VersionCreated {
                file_item_id,
                version_id: version.id,
                version_number: version.version_number,
            }),
        );
        Ok(version)
    }

    /// Versions of an item, including soft-deleted ones for callers that
    /// render history.
    pub async fn list_versions(&self, file_item_id: Uuid) -> AppResult<Vec<FileVersion>> {
        self.files.find_versions(file_item_id).await
    }

    /// Live assets of a version.
    pub async fn list_assets(&self, version_id: Uuid) -> AppResult<Vec<FileVersionAsset>> {
        self.files.find_assets(version_id).await
    }

    /// Upload an asset payload for one language of a version.
    ///
    /// The blob is committed to storage first; only then is the asset
    /// row inserted. If the row insert fails (duplicate language,
    /// deleted version) the orphaned blob is deleted again. When the
    /// owning item has no current version yet, this upload promotes the
    /// version to current.
    pub async fn upload_asset(
        &self,
        actor: &Actor,
        version_id: Uuid,
        lang: &str,
        original_name: &str,
        mime: Option<&str>,
        data: Bytes,
    ) -> AppResult<FileVersionAsset> {
        let (item, version) = self.checked_version(version_id).await?;
        if version.deleted_at.is_some() || item.is_deleted() {
            return Err(AppError::invalid_state(
                "Cannot upload an asset to a deleted version",
            ));
        }
        let had_current = item.current_version_id.is_some();

        let blob = tokio::time::timeout(self.upload_timeout, self.blobs.put(data))
            .await
            .map_err(|_| AppError::storage("Asset upload timed out"))??;

        let asset = match self
            .files
            .insert_asset(version_id, lang, original_name, mime, &blob)
            .await
        {
            Ok(asset) => asset,
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&blob.path).await {
                    warn!(path = %blob.path, error = %cleanup, "Failed to delete orphaned blob");
                }
                return Err(e);
            }
        };

        info!(
            version_id = %version_id,
            lang = %lang,
            size_bytes = asset.size_bytes,
            "Asset uploaded"
        );
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::AssetUploaded {
                file_item_id: item.id,
                version_id,
                lang: lang.to_string(),
                size_bytes: asset.size_bytes,
            }),
        );
        if !had_current {
            self.events.emit(
                Some(actor.user_id),
                EventPayload::File(FileEvent::CurrentVersionChanged {
                    file_item_id: item.id,
                    version_id,
                }),
            );
        }
        Ok(asset)
    }

    /// Point the item at a different (live, owned) version.
    pub async fn set_current_version(
        &self,
        actor: &Actor,
        file_item_id: Uuid,
        version_id: Uuid,
    ) -> AppResult<FileItem> {
        let item = self.files.set_current_version(file_item_id, version_id).await?;

        info!(file_item_id = %file_item_id, version_id = %version_id, "Current version changed");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::CurrentVersionChanged {
                file_item_id,
                version_id,
            }),
        );
        Ok(item)
    }

    /// Soft-delete a version. The current version of an item cannot be
    /// deleted; callers must reassign the pointer first.
    pub async fn delete_version(&self, actor: &Actor, version_id: Uuid) -> AppResult<FileVersion> {
        let deleted = self.files.soft_delete_version(version_id).await?;

        info!(version_id = %version_id, "Version deleted");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::VersionDeleted {
                file_item_id: deleted.file_item_id,
                version_id,
            }),
        );
        Ok(deleted)
    }

    /// Soft-delete a single asset. A later upload may replace it.
    pub async fn delete_asset(&self, actor: &Actor, asset_id: Uuid) -> AppResult<FileVersionAsset> {
        let asset = self.files.soft_delete_asset(asset_id).await?;
        info!(asset_id = %asset_id, actor_id = %actor.user_id, "Asset deleted");
        Ok(asset)
    }

    async fn checked_version(&self, version_id: Uuid) -> AppResult<(FileItem, FileVersion)> {
        let version = self
            .files
            .find_version(version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;
        let item = self
            .files
            .find_by_id(version.file_item_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("File item {} not found", version.file_item_id))
            })?;
        Ok((item, version))
    }
}
