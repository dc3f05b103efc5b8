//! File repository implementation: items, versions, assets, translations,
//! and access allow-lists.
//!
//! Every mutation that touches more than one row runs in a single
//! transaction. Version number assignment locks the parent item row so
//! concurrent `create_version` calls on the same item serialize.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use doclib_core::error::{AppError, ErrorKind};
use doclib_core::result::AppResult;
use doclib_core::traits::storage::StoredBlob;
use doclib_core::types::pagination::{PageRequest, PageResponse};
use doclib_entity::access::AccessType;
use doclib_entity::file::{
    CreateFileItem, FileItem, FileVersion, FileVersionAsset, Translation, TranslationInput,
};

/// Repository for file items and everything they own.
#[derive(Debug, Clone)]
pub struct FileItemRepository {
    pool: PgPool,
}

impl FileItemRepository {
    /// Create a new file item repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // -- Queries --

    /// Find a file item by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileItem>> {
        sqlx::query_as::<_, FileItem>("SELECT * FROM file_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file item", e))
    }

    /// Find a version by ID.
    pub async fn find_version(&self, version_id: Uuid) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>("SELECT * FROM file_versions WHERE id = $1")
            .bind(version_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    /// List all versions of an item, newest number first.
    pub async fn find_versions(&self, file_item_id: Uuid) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_item_id = $1 ORDER BY version_number DESC",
        )
        .bind(file_item_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    /// Find an asset by ID.
    pub async fn find_asset(&self, asset_id: Uuid) -> AppResult<Option<FileVersionAsset>> {
        sqlx::query_as::<_, FileVersionAsset>("SELECT * FROM file_version_assets WHERE id = $1")
            .bind(asset_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find asset", e))
    }

    /// List the live assets of a version.
    pub async fn find_assets(&self, version_id: Uuid) -> AppResult<Vec<FileVersionAsset>> {
        sqlx::query_as::<_, FileVersionAsset>(
            "SELECT * FROM file_version_assets \
             WHERE version_id = $1 AND deleted_at IS NULL ORDER BY lang ASC",
        )
        .bind(version_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list assets", e))
    }

    /// Load the translation set of an item.
    pub async fn find_translations(&self, file_item_id: Uuid) -> AppResult<Vec<Translation>> {
        sqlx::query_as::<_, Translation>(
            "SELECT * FROM file_item_translations WHERE owner_id = $1 ORDER BY lang ASC",
        )
        .bind(file_item_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list translations", e))
    }

    /// List live items in a category with pagination.
    pub async fn find_by_category(
        &self,
        category_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileItem>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM file_items WHERE category_id = $1 AND deleted_at IS NULL",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count file items", e))?;

        let items = sqlx::query_as::<_, FileItem>(
            "SELECT * FROM file_items WHERE category_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(category_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list file items", e))?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List soft-deleted items (the trash), newest deletion first.
    pub async fn find_trash(&self, page: &PageRequest) -> AppResult<PageResponse<FileItem>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM file_items WHERE deleted_at IS NOT NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count trash", e)
                })?;

        let items = sqlx::query_as::<_, FileItem>(
            "SELECT * FROM file_items WHERE deleted_at IS NOT NULL \
             ORDER BY deleted_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list trash", e))?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Load the access allow-lists of an item as id vectors.
    pub async fn find_access_lists(&self, file_item_id: Uuid) -> AppResult<(Vec<Uuid>, Vec<Uuid>)> {
        let departments: Vec<Uuid> = sqlx::query_scalar(
            "SELECT department_id FROM file_access_departments WHERE file_item_id = $1",
        )
        .bind(file_item_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load department list", e)
        })?;

        let users: Vec<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM file_access_users WHERE file_item_id = $1")
                .bind(file_item_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to load user list", e)
                })?;

        Ok((departments, users))
    }

    // -- Mutations --

    /// Create a file item with its initial version #1 and translations,
    /// atomically. The current-version pointer stays NULL until the first
    /// asset upload succeeds.
    pub async fn create_with_initial_version(
        &self,
        data: &CreateFileItem,
        translations: &[TranslationInput],
        access_departments: &[Uuid],
        access_users: &[Uuid],
    ) -> AppResult<(FileItem, FileVersion)> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let item = sqlx::query_as::<_, FileItem>(
            "INSERT INTO file_items (section_id, category_id, access_type, allow_version_access, created_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.section_id)
        .bind(data.category_id)
        .bind(data.access_type)
        .bind(data.allow_version_access)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        let version = insert_version(&mut tx, item.id, 1, None, data.created_by).await?;
        insert_translations(&mut tx, "file_item_translations", item.id, translations).await?;
        insert_access_rows(&mut tx, item.id, access_departments, access_users).await?;

        tx.commit().await.map_err(db_err)?;
        Ok((item, version))
    }

    /// Create a new version numbered max+1 under an item.
    ///
    /// Locks the item row for the duration of number assignment so two
    /// concurrent calls cannot produce duplicate numbers. Does not change
    /// the current-version pointer.
    pub async fn create_version(
        &self,
        file_item_id: Uuid,
        comment: Option<&str>,
        created_by: Uuid,
    ) -> AppResult<FileVersion> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let item = sqlx::query_as::<_, FileItem>(
            "SELECT * FROM file_items WHERE id = $1 FOR UPDATE",
        )
        .bind(file_item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::not_found(format!("File item {file_item_id} not found")))?;

        if item.deleted_at.is_some() {
            return Err(AppError::invalid_state(
                "Cannot create a version on a deleted file item",
            ));
        }

        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(version_number), 0) + 1 FROM file_versions WHERE file_item_id = $1",
        )
        .bind(file_item_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        let version = insert_version(&mut tx, file_item_id, next, comment, created_by).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(version)
    }

    /// Insert an asset for a version language and, when the owning item
    /// has no current version yet, promote this version to current —
    /// atomically.
    ///
    /// Fails with `Conflict` when a live asset for the (version, lang)
    /// pair already exists.
    pub async fn insert_asset(
        &self,
        version_id: Uuid,
        lang: &str,
        original_name: &str,
        mime: Option<&str>,
        blob: &StoredBlob,
    ) -> AppResult<FileVersionAsset> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Lock the version and its item so a racing soft delete cannot
        // land between this check and the insert.
        let live: Option<(bool, bool)> = sqlx::query_as(
            "SELECT v.deleted_at IS NULL, i.deleted_at IS NULL \
             FROM file_versions v \
             JOIN file_items i ON i.id = v.file_item_id \
             WHERE v.id = $1 \
             FOR UPDATE",
        )
        .bind(version_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        match live {
            None => return Err(AppError::not_found("File version not found")),
            Some((version_live, item_live)) if !version_live || !item_live => {
                return Err(AppError::invalid_state(
                    "Cannot attach an asset to a deleted version",
                ));
            }
            Some(_) => {}
        }

        let asset = sqlx::query_as::<_, FileVersionAsset>(
            "INSERT INTO file_version_assets \
             (version_id, lang, original_name, mime, size_bytes, storage_path, checksum_sha256) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(version_id)
        .bind(lang)
        .bind(original_name)
        .bind(mime)
        .bind(blob.size_bytes)
        .bind(&blob.path)
        .bind(&blob.checksum_sha256)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db)
                if db.constraint() == Some("file_version_assets_version_lang_key") =>
            {
                AppError::conflict(format!(
                    "An asset for language '{lang}' already exists on this version"
                ))
            }
            _ => db_err(e),
        })?;

        sqlx::query(
            "UPDATE file_items SET current_version_id = $1, updated_at = NOW() \
             WHERE id = (SELECT file_item_id FROM file_versions WHERE id = $1) \
               AND current_version_id IS NULL",
        )
        .bind(version_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(asset)
    }

    /// Atomically swap the current-version pointer.
    ///
    /// The guarded update only matches when the version belongs to the
    /// item and is not deleted; zero rows means the swap was illegal.
    pub async fn set_current_version(
        &self,
        file_item_id: Uuid,
        version_id: Uuid,
    ) -> AppResult<FileItem> {
        sqlx::query_as::<_, FileItem>(
            "UPDATE file_items SET current_version_id = $2, updated_at = NOW() \
             FROM file_versions v \
             WHERE file_items.id = $1 AND v.id = $2 \
               AND v.file_item_id = $1 AND v.deleted_at IS NULL \
             RETURNING file_items.*",
        )
        .bind(file_item_id)
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set current version", e))?
        .ok_or_else(|| {
            AppError::invalid_state(format!(
                "Version {version_id} is deleted, missing, or does not belong to item {file_item_id}"
            ))
        })
    }

    /// Soft-delete a version. The guard refuses the current version of
    /// its item; callers must reassign first.
    pub async fn soft_delete_version(&self, version_id: Uuid) -> AppResult<FileVersion> {
        let deleted = sqlx::query_as::<_, FileVersion>(
            "UPDATE file_versions SET deleted_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
               AND NOT EXISTS (SELECT 1 FROM file_items i \
                               WHERE i.id = file_versions.file_item_id \
                                 AND i.current_version_id = $1) \
             RETURNING *",
        )
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete version", e))?;
        match deleted {
            Some(version) => Ok(version),
            None if !self.version_exists(version_id).await? => {
                Err(AppError::not_found(format!("Version {version_id} not found")))
            }
            None => Err(AppError::conflict(format!(
                "Version {version_id} is the current version or already deleted"
            ))),
        }
    }

    /// Soft-delete an asset.
    pub async fn soft_delete_asset(&self, asset_id: Uuid) -> AppResult<FileVersionAsset> {
        sqlx::query_as::<_, FileVersionAsset>(
            "UPDATE file_version_assets SET deleted_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete asset", e))?
        .ok_or_else(|| {
            AppError::not_found(format!("Asset {asset_id} not found or already deleted"))
        })
    }

    /// Soft-delete a file item (move to trash).
    pub async fn soft_delete_item(&self, id: Uuid) -> AppResult<FileItem> {
        let deleted = sqlx::query_as::<_, FileItem>(
            "UPDATE file_items SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file item", e))?;
        match deleted {
            Some(item) => Ok(item),
            None if !self.item_exists(id).await? => {
                Err(AppError::not_found(format!("File item {id} not found")))
            }
            None => Err(AppError::invalid_state(format!(
                "File item {id} is already deleted"
            ))),
        }
    }

    async fn item_exists(&self, id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM file_items WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn version_exists(&self, id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM file_versions WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Restore a soft-deleted item and re-validate the current-version
    /// invariant: a pointer at a still-deleted version is nulled.
    pub async fn restore_item(&self, id: Uuid) -> AppResult<FileItem> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let restored = sqlx::query_as::<_, FileItem>(
            "UPDATE file_items SET deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NOT NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| {
            AppError::invalid_state(format!("File item {id} is not in the trash"))
        })?;

        let item = sqlx::query_as::<_, FileItem>(
            "UPDATE file_items SET current_version_id = NULL \
             WHERE id = $1 AND current_version_id IS NOT NULL \
               AND EXISTS (SELECT 1 FROM file_versions v \
                           WHERE v.id = file_items.current_version_id \
                             AND v.deleted_at IS NOT NULL) \
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .unwrap_or(restored);

        tx.commit().await.map_err(db_err)?;
        Ok(item)
    }

    /// Hard-delete a soft-deleted item and everything it owns. Returns
    /// the storage paths of its assets for reclamation.
    pub async fn force_delete_item(&self, id: Uuid) -> AppResult<Vec<String>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let deleted: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM file_items WHERE id = $1 AND deleted_at IS NOT NULL")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
        if deleted.is_none() {
            return Err(AppError::invalid_state(format!(
                "File item {id} must be soft-deleted before force delete"
            )));
        }

        let paths: Vec<String> = sqlx::query_scalar(
            "SELECT a.storage_path FROM file_version_assets a \
             JOIN file_versions v ON v.id = a.version_id \
             WHERE v.file_item_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;

        // The pointer FK has no cascade; clear it before the delete.
        sqlx::query("UPDATE file_items SET current_version_id = NULL WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("DELETE FROM file_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(paths)
    }

    /// Hard-delete a soft-deleted version. Returns asset storage paths.
    pub async fn force_delete_version(&self, version_id: Uuid) -> AppResult<Vec<String>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let deleted: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM file_versions WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(version_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        if deleted.is_none() {
            return Err(AppError::invalid_state(format!(
                "Version {version_id} must be soft-deleted before force delete"
            )));
        }

        let paths: Vec<String> =
            sqlx::query_scalar("SELECT storage_path FROM file_version_assets WHERE version_id = $1")
                .bind(version_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(db_err)?;

        sqlx::query("DELETE FROM file_versions WHERE id = $1")
            .bind(version_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(paths)
    }

    /// Hard-delete a soft-deleted asset. Returns its storage path.
    pub async fn force_delete_asset(&self, asset_id: Uuid) -> AppResult<String> {
        let path: Option<String> = sqlx::query_scalar(
            "DELETE FROM file_version_assets WHERE id = $1 AND deleted_at IS NOT NULL \
             RETURNING storage_path",
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to force delete asset", e))?;

        path.ok_or_else(|| {
            AppError::invalid_state(format!(
                "Asset {asset_id} must be soft-deleted before force delete"
            ))
        })
    }

    /// Replace the item's translation set atomically.
    pub async fn replace_translations(
        &self,
        file_item_id: Uuid,
        translations: &[TranslationInput],
    ) -> AppResult<Vec<Translation>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query("DELETE FROM file_item_translations WHERE owner_id = $1")
            .bind(file_item_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let rows =
            insert_translations(&mut tx, "file_item_translations", file_item_id, translations)
                .await?;
        tx.commit().await.map_err(db_err)?;
        Ok(rows)
    }

    /// Replace the item's access policy and allow-lists atomically.
    pub async fn replace_access(
        &self,
        file_item_id: Uuid,
        access_type: AccessType,
        allow_version_access: bool,
        departments: &[Uuid],
        users: &[Uuid],
    ) -> AppResult<FileItem> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let item = sqlx::query_as::<_, FileItem>(
            "UPDATE file_items SET access_type = $2, allow_version_access = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(file_item_id)
        .bind(access_type)
        .bind(allow_version_access)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::not_found(format!("File item {file_item_id} not found")))?;

        sqlx::query("DELETE FROM file_access_departments WHERE file_item_id = $1")
            .bind(file_item_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM file_access_users WHERE file_item_id = $1")
            .bind(file_item_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        insert_access_rows(&mut tx, file_item_id, departments, users).await?;

        tx.commit().await.map_err(db_err)?;
        Ok(item)
    }
}

// -- Shared transaction helpers (also used by the request repository) --

pub(crate) async fn insert_version(
    tx: &mut Transaction<'_, Postgres>,
    file_item_id: Uuid,
    version_number: i32,
    comment: Option<&str>,
    created_by: Uuid,
) -> AppResult<FileVersion> {
    sqlx::query_as::<_, FileVersion>(
        "INSERT INTO file_versions (file_item_id, version_number, comment, created_by) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(file_item_id)
    .bind(version_number)
    .bind(comment)
    .bind(created_by)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db)
            if db.constraint() == Some("file_versions_item_number_key") =>
        {
            AppError::conflict(format!(
                "Version number {version_number} already exists for item {file_item_id}"
            ))
        }
        _ => db_err(e),
    })
}

pub(crate) async fn insert_translations(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    owner_id: Uuid,
    translations: &[TranslationInput],
) -> AppResult<Vec<Translation>> {
    // `table` is always a compile-time constant supplied by this crate.
    let sql = format!(
        "INSERT INTO {table} (owner_id, lang, title, description) \
         VALUES ($1, $2, $3, $4) RETURNING *"
    );
    let mut rows = Vec::with_capacity(translations.len());
    for t in translations {
        let row = sqlx::query_as::<_, Translation>(&sql)
            .bind(owner_id)
            .bind(&t.lang)
            .bind(&t.title)
            .bind(&t.description)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::conflict(
                    format!("Duplicate translation language '{}'", t.lang),
                ),
                _ => db_err(e),
            })?;
        rows.push(row);
    }
    Ok(rows)
}

pub(crate) async fn insert_access_rows(
    tx: &mut Transaction<'_, Postgres>,
    file_item_id: Uuid,
    departments: &[Uuid],
    users: &[Uuid],
) -> AppResult<()> {
    for dept in departments {
        sqlx::query(
            "INSERT INTO file_access_departments (file_item_id, department_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(file_item_id)
        .bind(dept)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
    }
    for user in users {
        sqlx::query(
            "INSERT INTO file_access_users (file_item_id, user_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(file_item_id)
        .bind(user)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
    }
    Ok(())
}

pub(crate) fn db_err(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, format!("Database error: {e}"), e)
}
