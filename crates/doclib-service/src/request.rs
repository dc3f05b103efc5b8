//! Publication request workflow.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use doclib_core::config::StorageConfig;
use doclib_core::error::AppError;
use doclib_core::events::{EventPayload, RequestEvent, RequestResolution};
use doclib_core::result::AppResult;
use doclib_core::traits::storage::BlobStore;
use doclib_core::types::pagination::{PageRequest, PageResponse};
use doclib_database::repositories::request::{ApprovalOutcome, CreateRequest};
use doclib_database::repositories::{FileItemRepository, RequestRepository};
use doclib_entity::access::{AccessType, Actor};
use doclib_entity::request::{FileRequest, RequestAsset, RequestType};
use doclib_storage::BlobReclaimer;

use crate::dispatch::EventDispatcher;
use crate::input::{self, TranslationPayload};

/// The publication request state machine: submission, staged uploads,
/// and terminal resolution by approvers or the submitter.
#[derive(Debug, Clone)]
pub struct RequestService {
    /// Request repository.
    requests: Arc<RequestRepository>,
    /// File repository, for update-target checks.
    files: Arc<FileItemRepository>,
    /// Blob storage for staged payloads.
    blobs: Arc<dyn BlobStore>,
    /// Reclaims staged blobs after reject/cancel.
    reclaimer: BlobReclaimer,
    /// Upper bound on one staged upload.
    upload_timeout: Duration,
    /// Audit and notification dispatch.
    events: EventDispatcher,
}

/// Data for submitting a publication request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitRequest {
    /// Target section.
    pub section_id: Uuid,
    /// Target category.
    pub category_id: Uuid,
    /// Proposed access policy.
    pub access_type: AccessType,
    /// Whether this publishes a new item or a new version of an
    /// existing one.
    pub request_type: RequestType,
    /// Target file item; required for `update` requests.
    pub file_item_id: Option<Uuid>,
    /// Submitter's comment, carried into the created version.
    pub comment: Option<String>,
    /// Proposed translation set; at least one is required.
    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    pub translations: Vec<TranslationPayload>,
    /// Proposed department allow-list.
    pub access_departments: Vec<Uuid>,
    /// Proposed user allow-list.
    pub access_users: Vec<Uuid>,
}

impl RequestService {
    /// Create a new request service.
    pub fn new(
        requests: Arc<RequestRepository>,
        files: Arc<FileItemRepository>,
        blobs: Arc<dyn BlobStore>,
        reclaimer: BlobReclaimer,
        storage: &StorageConfig,
        events: EventDispatcher,
    ) -> Self {
        Self {
            requests,
            files,
            blobs,
            reclaimer,
            upload_timeout: Duration::from_secs(storage.upload_timeout_seconds),
            events,
        }
    }

    /// Submit a request. `update` requests must target an existing,
    /// non-deleted file item.
    pub async fn submit(&self, actor: &Actor, req: SubmitRequest) -> AppResult<FileRequest> {
        input::check(&req)?;
        let translations = input::translation_inputs(req.translations)?;

        if req.request_type == RequestType::Update {
            let target_id = req.file_item_id.ok_or_else(|| {
                AppError::validation("Update requests must name a target file item")
            })?;
            let target = self
                .files
                .find_by_id(target_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("File item {target_id} not found"))
                })?;
            if target.is_deleted() {
                return Err(AppError::invalid_state(
                    "Cannot request an update to a deleted file item",
                ));
            }
        }

        let data = CreateRequest {
            section_id: req.section_id,
            category_id: req.category_id,
            access_type: req.access_type,
            request_type: req.request_type,
            file_item_id: req.file_item_id,
            comment: req.comment,
            created_by: actor.user_id,
        };
        let request = self
            .requests
            .create(&data, &translations, &req.access_departments, &req.access_users)
            .await?;

        info!(
            request_id = %request.id,
            request_type = ?request.request_type,
            submitter_id = %actor.user_id,
            "Request submitted"
        );
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Request(RequestEvent::Submitted {
                request_id: request.id,
                request_type: request.request_type.as_str().to_string(),
            }),
        );
        Ok(request)
    }

    /// Stage an asset payload against a pending request.
    pub async fn upload_staged_asset(
        &self,
        actor: &Actor,
        request_id: Uuid,
        lang: &str,
        original_name: &str,
        mime: Option<&str>,
        data: Bytes,
    ) -> AppResult<RequestAsset> {
        let request = self.get(request_id).await?;
        if !request.is_pending() {
            return Err(AppError::invalid_state(
                "Assets can only be staged on pending requests",
            ));
        }

        let blob = tokio::time::timeout(self.upload_timeout, self.blobs.put(data))
            .await
            .map_err(|_| AppError::storage("Staged upload timed out"))??;

        let asset = match self
            .requests
            .insert_staged_asset(request_id, lang, original_name, mime, &blob)
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

        info!(request_id = %request_id, lang = %lang, "Asset staged");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Request(RequestEvent::AssetStaged {
                request_id,
                lang: lang.to_string(),
            }),
        );
        Ok(asset)
    }

    /// Approve a pending request, promoting its staged content into the
    /// repository in a single transaction. A request that has already
    /// been resolved fails with `InvalidState`.
    pub async fn approve(&self, actor: &Actor, request_id: Uuid) -> AppResult<ApprovalOutcome> {
        let outcome = self.requests.approve(request_id, actor.user_id).await?;

        info!(
            request_id = %request_id,
            file_item_id = %outcome.file_item_id,
            version_id = %outcome.version.id,
            approver_id = %actor.user_id,
            "Request approved"
        );
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Request(RequestEvent::Approved {
                request_id,
                file_item_id: outcome.file_item_id,
                version_id: outcome.version.id,
            }),
        );
        self.events.notify_resolution(RequestResolution {
            request_id,
            submitter_id: outcome.request.created_by,
            approved: true,
            rejection_reason: None,
            file_item_id: Some(outcome.file_item_id),
        });
        Ok(outcome)
    }

    /// Reject a pending request. Staged blobs are reclaimed best-effort.
    pub async fn reject(
        &self,
        actor: &Actor,
        request_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<FileRequest> {
        let (request, paths) = self
            .requests
            .reject(request_id, actor.user_id, reason.as_deref())
            .await?;
        self.reclaimer.reclaim_detached(paths);

        info!(request_id = %request_id, approver_id = %actor.user_id, "Request rejected");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Request(RequestEvent::Rejected { request_id }),
        );
        self.events.notify_resolution(RequestResolution {
            request_id,
            submitter_id: request.created_by,
            approved: false,
            rejection_reason: request.rejection_reason.clone(),
            file_item_id: None,
        });
        Ok(request)
    }

    /// Cancel a pending request. Only its submitter may cancel.
    pub async fn cancel(&self, actor: &Actor, request_id: Uuid) -> AppResult<FileRequest> {
        let request = self.get(request_id).await?;
        if request.created_by != actor.user_id {
            return Err(AppError::forbidden(
                "Only the submitter may cancel a request",
            ));
        }

        let (request, paths) = self.requests.cancel(request_id, actor.user_id).await?;
        self.reclaimer.reclaim_detached(paths);

        info!(request_id = %request_id, "Request canceled");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Request(RequestEvent::Canceled { request_id }),
        );
        Ok(request)
    }

    /// Fetch one request.
    pub async fn get(&self, request_id: Uuid) -> AppResult<FileRequest> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Request {request_id} not found")))
    }

    /// The moderation queue: pending requests, oldest first.
    pub async fn list_pending(&self, page: &PageRequest) -> AppResult<PageResponse<FileRequest>> {
        self.requests.find_pending(page).await
    }

    /// Staged assets of a request.
    pub async fn staged_assets(&self, request_id: Uuid) -> AppResult<Vec<RequestAsset>> {
        self.requests.find_staged_assets(request_id).await
    }
}
