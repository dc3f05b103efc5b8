//! Favorites repository.

use sqlx::PgPool;
use uuid::Uuid;

use doclib_core::error::{AppError, ErrorKind};
use doclib_core::result::AppResult;
use doclib_core::types::pagination::{PageRequest, PageResponse};
use doclib_entity::favorite::Favorite;
use doclib_entity::file::FileItem;

use super::file::db_err;

/// Repository for the per-user favorites set.
#[derive(Debug, Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    /// Create a new favorites repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a file item to a user's favorites. Idempotent: repeating the
    /// call leaves the original row (and its timestamp) untouched.
    pub async fn add(&self, file_item_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO file_favorites (file_item_id, user_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(file_item_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Remove a file item from a user's favorites. Removing an absent
    /// favorite is a no-op.
    pub async fn remove(&self, file_item_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM file_favorites WHERE file_item_id = $1 AND user_id = $2")
            .bind(file_item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Whether the user has favorited the item.
    pub async fn exists(&self, file_item_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM file_favorites WHERE file_item_id = $1 AND user_id = $2)",
        )
        .bind(file_item_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check favorite", e))
    }

    /// List a user's favorited file items, newest favorite first.
    /// Soft-deleted items are filtered out rather than surfaced.
    pub async fn find_items_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileItem>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM file_favorites f \
             JOIN file_items i ON i.id = f.file_item_id \
             WHERE f.user_id = $1 AND i.deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count favorites", e))?;

        let items = sqlx::query_as::<_, FileItem>(
            "SELECT i.* FROM file_favorites f \
             JOIN file_items i ON i.id = f.file_item_id \
             WHERE f.user_id = $1 AND i.deleted_at IS NULL \
             ORDER BY f.created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list favorites", e))?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Raw favorite rows for a user, most recent first.
    pub async fn find_for_user(&self, user_id: Uuid) -> AppResult<Vec<Favorite>> {
        sqlx::query_as::<_, Favorite>(
            "SELECT * FROM file_favorites WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list favorites", e))
    }
}
