//! Download ledger repository.
//!
//! The ledger is append-only: rows are never updated or deleted, and
//! they survive soft deletion of the file content they point at.

use sqlx::PgPool;
use uuid::Uuid;

use doclib_core::error::{AppError, ErrorKind};
use doclib_core::result::AppResult;
use doclib_core::types::pagination::{PageRequest, PageResponse};
use doclib_entity::download::{CreateDownloadEvent, DownloadEvent};

use super::file::db_err;

/// Repository for the append-only download ledger.
#[derive(Debug, Clone)]
pub struct DownloadRepository {
    pool: PgPool,
}

impl DownloadRepository {
    /// Create a new download repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one download event.
    pub async fn append(&self, event: &CreateDownloadEvent) -> AppResult<DownloadEvent> {
        sqlx::query_as::<_, DownloadEvent>(
            "INSERT INTO downloads (file_item_id, version_id, asset_id, lang, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(event.file_item_id)
        .bind(event.version_id)
        .bind(event.asset_id)
        .bind(&event.lang)
        .bind(event.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// List downloads of a file item, newest first.
    pub async fn find_by_file_item(
        &self,
        file_item_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DownloadEvent>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM downloads WHERE file_item_id = $1")
                .bind(file_item_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count downloads", e)
                })?;

        let events = sqlx::query_as::<_, DownloadEvent>(
            "SELECT * FROM downloads WHERE file_item_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(file_item_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list downloads", e))?;

        Ok(PageResponse::new(
            events,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Total download count of a file item across all versions.
    pub async fn count_by_file_item(&self, file_item_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM downloads WHERE file_item_id = $1")
            .bind(file_item_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count downloads", e))
    }
}
