//! Publication request repository.
//!
//! Resolution methods perform the guarded status flip
//! (`WHERE status = 'pending'`) and every promotion side effect inside
//! one transaction, so a request is never observably half-approved and a
//! second resolution attempt fails cleanly.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use doclib_core::error::{AppError, ErrorKind};
use doclib_core::result::AppResult;
use doclib_core::traits::storage::StoredBlob;
use doclib_core::types::pagination::{PageRequest, PageResponse};
use doclib_entity::access::AccessType;
use doclib_entity::file::{FileItem, FileVersion, Translation, TranslationInput};
use doclib_entity::request::{FileRequest, RequestAsset, RequestStatus, RequestType};

use super::file::{db_err, insert_access_rows, insert_translations, insert_version};

/// Data required to submit a new publication request.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Target section.
    pub section_id: Uuid,
    /// Target category.
    pub category_id: Uuid,
    /// Proposed access policy.
    pub access_type: AccessType,
    /// `new` or `update`.
    pub request_type: RequestType,
    /// Target file item for `update` requests.
    pub file_item_id: Option<Uuid>,
    /// Submitter's comment.
    pub comment: Option<String>,
    /// The submitting user.
    pub created_by: Uuid,
}

/// Outcome of a successful approval.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The resolved request row.
    pub request: FileRequest,
    /// The file item the staged content landed in.
    pub file_item_id: Uuid,
    /// The version created from the staged content.
    pub version: FileVersion,
}

/// Repository for publication requests and their staged rows.
#[derive(Debug, Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    /// Create a new request repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileRequest>> {
        sqlx::query_as::<_, FileRequest>("SELECT * FROM file_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find request", e))
    }

    /// List pending requests, FIFO by creation time.
    pub async fn find_pending(&self, page: &PageRequest) -> AppResult<PageResponse<FileRequest>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM file_requests WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count requests", e)
                })?;

        let requests = sqlx::query_as::<_, FileRequest>(
            "SELECT * FROM file_requests WHERE status = 'pending' \
             ORDER BY created_at ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list requests", e))?;

        Ok(PageResponse::new(
            requests,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Load the staged translations of a request.
    pub async fn find_translations(&self, request_id: Uuid) -> AppResult<Vec<Translation>> {
        sqlx::query_as::<_, Translation>(
            "SELECT * FROM file_request_translations WHERE owner_id = $1 ORDER BY lang ASC",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list request translations", e)
        })
    }

    /// Load the staged assets of a request.
    pub async fn find_staged_assets(&self, request_id: Uuid) -> AppResult<Vec<RequestAsset>> {
        sqlx::query_as::<_, RequestAsset>(
            "SELECT * FROM file_request_assets WHERE request_id = $1 ORDER BY lang ASC",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list staged assets", e))
    }

    /// Create a request with its translations and allow-lists atomically.
    pub async fn create(
        &self,
        data: &CreateRequest,
        translations: &[TranslationInput],
        access_departments: &[Uuid],
        access_users: &[Uuid],
    ) -> AppResult<FileRequest> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let request = sqlx::query_as::<_, FileRequest>(
            "INSERT INTO file_requests \
             (section_id, category_id, access_type, request_type, file_item_id, comment, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.section_id)
        .bind(data.category_id)
        .bind(data.access_type)
        .bind(data.request_type)
        .bind(data.file_item_id)
        .bind(&data.comment)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        insert_translations(&mut tx, "file_request_translations", request.id, translations)
            .await?;

        for dept in access_departments {
            sqlx::query(
                "INSERT INTO file_request_access_departments (request_id, department_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(request.id)
            .bind(dept)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        for user in access_users {
            sqlx::query(
                "INSERT INTO file_request_access_users (request_id, user_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(request.id)
            .bind(user)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(request)
    }

    /// Stage an asset against a pending request.
    ///
    /// The insert is guarded on the request still being pending, so a
    /// concurrent resolution cannot race a late upload in.
    pub async fn insert_staged_asset(
        &self,
        request_id: Uuid,
        lang: &str,
        original_name: &str,
        mime: Option<&str>,
        blob: &StoredBlob,
    ) -> AppResult<RequestAsset> {
        let staged = sqlx::query_as::<_, RequestAsset>(
            "INSERT INTO file_request_assets \
             (request_id, lang, original_name, mime, size_bytes, storage_path, checksum_sha256) \
             SELECT $1, $2, $3, $4, $5, $6, $7 \
             FROM file_requests WHERE id = $1 AND status = 'pending' \
             RETURNING *",
        )
        .bind(request_id)
        .bind(lang)
        .bind(original_name)
        .bind(mime)
        .bind(blob.size_bytes)
        .bind(&blob.path)
        .bind(&blob.checksum_sha256)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db)
                if db.constraint() == Some("file_request_assets_request_lang_key") =>
            {
                AppError::conflict(format!(
                    "An asset for language '{lang}' is already staged on this request"
                ))
            }
            _ => db_err(e),
        })?;
        match staged {
            Some(asset) => Ok(asset),
            None if !self.request_exists(request_id).await? => {
                Err(AppError::not_found(format!("Request {request_id} not found")))
            }
            None => Err(AppError::invalid_state(format!(
                "Request {request_id} is not pending"
            ))),
        }
    }

    async fn request_exists(&self, id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM file_requests WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Approve a pending request and promote its staged content, all in
    /// one transaction.
    ///
    /// For `new` requests this creates the file item (with the staged
    /// translations and allow-lists) and version #1; for `update`
    /// requests a max+1 version under the target item. Staged assets are
    /// moved — their blob handles are re-owned by the created version and
    /// the staged rows are gone afterwards. The version becomes current.
    pub async fn approve(&self, request_id: Uuid, approver_id: Uuid) -> AppResult<ApprovalOutcome> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let request = flip_status(
            &mut tx,
            request_id,
            RequestStatus::Approved,
            approver_id,
            None,
        )
        .await?;

        let translations: Vec<Translation> = sqlx::query_as(
            "SELECT * FROM file_request_translations WHERE owner_id = $1 ORDER BY lang ASC",
        )
        .bind(request_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;
        let inputs: Vec<TranslationInput> = translations
            .iter()
            .map(|t| TranslationInput {
                lang: t.lang.clone(),
                title: t.title.clone(),
                description: t.description.clone(),
            })
            .collect();

        let (file_item_id, version) = match request.request_type {
            RequestType::New => {
                let item = sqlx::query_as::<_, FileItem>(
                    "INSERT INTO file_items \
                     (section_id, category_id, access_type, created_by) \
                     VALUES ($1, $2, $3, $4) RETURNING *",
                )
                .bind(request.section_id)
                .bind(request.category_id)
                .bind(request.access_type)
                .bind(request.created_by)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;

                insert_translations(&mut tx, "file_item_translations", item.id, &inputs).await?;

                let departments: Vec<Uuid> = sqlx::query_scalar(
                    "SELECT department_id FROM file_request_access_departments WHERE request_id = $1",
                )
                .bind(request_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(db_err)?;
                let users: Vec<Uuid> = sqlx::query_scalar(
                    "SELECT user_id FROM file_request_access_users WHERE request_id = $1",
                )
                .bind(request_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(db_err)?;
                insert_access_rows(&mut tx, item.id, &departments, &users).await?;

                let version =
                    insert_version(&mut tx, item.id, 1, request.comment.as_deref(), request.created_by)
                        .await?;
                (item.id, version)
            }
            RequestType::Update => {
                let target_id = request.file_item_id.ok_or_else(|| {
                    AppError::invalid_state("Update request has no target file item")
                })?;

                let target = sqlx::query_as::<_, FileItem>(
                    "SELECT * FROM file_items WHERE id = $1 FOR UPDATE",
                )
                .bind(target_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?
                .ok_or_else(|| {
                    AppError::not_found(format!("Target file item {target_id} not found"))
                })?;
                if target.deleted_at.is_some() {
                    return Err(AppError::invalid_state(
                        "Cannot approve an update against a deleted file item",
                    ));
                }

                let next: i32 = sqlx::query_scalar(
                    "SELECT COALESCE(MAX(version_number), 0) + 1 \
                     FROM file_versions WHERE file_item_id = $1",
                )
                .bind(target_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;

                let version = insert_version(
                    &mut tx,
                    target_id,
                    next,
                    request.comment.as_deref(),
                    request.created_by,
                )
                .await?;
                (target_id, version)
            }
        };

        insert_translations(&mut tx, "file_version_translations", version.id, &inputs).await?;

        // Move staged assets: the blob handles are re-owned by the new
        // version; the staged rows cease to exist in the same transaction,
        // so both are never independently visible.
        sqlx::query(
            "INSERT INTO file_version_assets \
             (version_id, lang, original_name, mime, size_bytes, storage_path, checksum_sha256) \
             SELECT $1, lang, original_name, mime, size_bytes, storage_path, checksum_sha256 \
             FROM file_request_assets WHERE request_id = $2",
        )
        .bind(version.id)
        .bind(request_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("DELETE FROM file_request_assets WHERE request_id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query(
            "UPDATE file_items SET current_version_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(file_item_id)
        .bind(version.id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(ApprovalOutcome {
            request,
            file_item_id,
            version,
        })
    }

    /// Reject a pending request. Staged asset rows are removed; the
    /// returned storage paths are handed to the blob reclaimer.
    pub async fn reject(
        &self,
        request_id: Uuid,
        approver_id: Uuid,
        reason: Option<&str>,
    ) -> AppResult<(FileRequest, Vec<String>)> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let request = flip_status(
            &mut tx,
            request_id,
            RequestStatus::Rejected,
            approver_id,
            reason,
        )
        .await?;
        let paths = discard_staged_assets(&mut tx, request_id).await?;
        tx.commit().await.map_err(db_err)?;
        Ok((request, paths))
    }

    /// Cancel a pending request on behalf of its submitter.
    pub async fn cancel(
        &self,
        request_id: Uuid,
        submitter_id: Uuid,
    ) -> AppResult<(FileRequest, Vec<String>)> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let request = flip_status(
            &mut tx,
            request_id,
            RequestStatus::Canceled,
            submitter_id,
            None,
        )
        .await?;
        let paths = discard_staged_assets(&mut tx, request_id).await?;
        tx.commit().await.map_err(db_err)?;
        Ok((request, paths))
    }
}

/// Guarded status flip: only matches while the request is pending, so a
/// second resolution attempt sees zero rows and fails with
/// `InvalidState`. A request that never existed fails with `NotFound`.
async fn flip_status(
    tx: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    status: RequestStatus,
    resolver_id: Uuid,
    rejection_reason: Option<&str>,
) -> AppResult<FileRequest> {
    let resolved_at: DateTime<Utc> = Utc::now();
    let flipped = sqlx::query_as::<_, FileRequest>(
        "UPDATE file_requests \
         SET status = $2, resolved_by = $3, resolved_at = $4, rejection_reason = $5, \
             updated_at = NOW() \
         WHERE id = $1 AND status = 'pending' RETURNING *",
    )
    .bind(request_id)
    .bind(status)
    .bind(resolver_id)
    .bind(resolved_at)
    .bind(rejection_reason)
    .fetch_optional(&mut **tx)
    .await
    .map_err(db_err)?;
    match flipped {
        Some(request) => Ok(request),
        None => {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM file_requests WHERE id = $1)")
                    .bind(request_id)
                    .fetch_one(&mut **tx)
                    .await
                    .map_err(db_err)?;
            if exists {
                Err(AppError::invalid_state(format!(
                    "Request {request_id} is not pending and cannot be resolved"
                )))
            } else {
                Err(AppError::not_found(format!("Request {request_id} not found")))
            }
        }
    }
}

async fn discard_staged_assets(
    tx: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
) -> AppResult<Vec<String>> {
    let paths: Vec<String> = sqlx::query_scalar(
        "DELETE FROM file_request_assets WHERE request_id = $1 RETURNING storage_path",
    )
    .bind(request_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(db_err)?;
    Ok(paths)
}
