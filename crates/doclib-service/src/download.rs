//! Asset downloads and the append-only ledger.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use doclib_core::error::AppError;
use doclib_core::result::AppResult;
use doclib_core::traits::storage::{BlobStore, ByteStream};
use doclib_core::types::pagination::{PageRequest, PageResponse};
use doclib_database::repositories::{DownloadRepository, FileItemRepository};
use doclib_entity::access::{can_download, AccessLists, Actor};
use doclib_entity::download::{CreateDownloadEvent, DownloadEvent};
use doclib_entity::file::FileVersionAsset;

/// Serves asset payloads after resolving access, recording every
/// download in the ledger. The ledger is append-only; aggregation is
/// left to an external stats engine.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// File repository.
    files: Arc<FileItemRepository>,
    /// Download ledger repository.
    downloads: Arc<DownloadRepository>,
    /// Blob storage backend.
    blobs: Arc<dyn BlobStore>,
}

impl DownloadService {
    /// Create a new download service.
    pub fn new(
        files: Arc<FileItemRepository>,
        downloads: Arc<DownloadRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            files,
            downloads,
            blobs,
        }
    }

    /// Open an asset for download, appending one ledger row.
    ///
    /// The access decision is the pure resolver's: item-level policy
    /// first, and non-current versions only where the item allows
    /// version access.
    pub async fn download_asset(
        &self,
        actor: &Actor,
        asset_id: Uuid,
    ) -> AppResult<(FileVersionAsset, ByteStream)> {
        let asset = self
            .files
            .find_asset(asset_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {asset_id} not found")))?;
        if asset.deleted_at.is_some() {
            return Err(AppError::not_found(format!("Asset {asset_id} not found")));
        }

        let version = self
            .files
            .find_version(asset.version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {} not found", asset.version_id)))?;
        let item = self
            .files
            .find_by_id(version.file_item_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("File item {} not found", version.file_item_id))
            })?;

        let (departments, users) = self.files.find_access_lists(item.id).await?;
        let lists = AccessLists::new(departments, users);
        if !can_download(actor, &item, &version, &lists) {
            return Err(AppError::forbidden("You may not download this asset"));
        }

        let stream = self.blobs.get(&asset.storage_path).await?;
        self.downloads
            .append(&CreateDownloadEvent {
                user_id: Some(actor.user_id),
                file_item_id: item.id,
                version_id: version.id,
                asset_id,
                lang: asset.lang.clone(),
            })
            .await?;

        info!(
            asset_id = %asset_id,
            file_item_id = %item.id,
            user_id = %actor.user_id,
            "Asset downloaded"
        );
        Ok((asset, stream))
    }

    /// Raw ledger rows for one file item, newest first.
    pub async fn list_downloads(
        &self,
        file_item_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DownloadEvent>> {
        self.downloads.find_by_file_item(file_item_id, page).await
    }

    /// Total downloads of a file item across all versions.
    pub async fn download_count(&self, file_item_id: Uuid) -> AppResult<i64> {
        self.downloads.count_by_file_item(file_item_id).await
    }
}
