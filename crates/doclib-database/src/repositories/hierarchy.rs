//! Department and category tree repositories.
//!
//! Depth bookkeeping (cycle checks, breadth-first recomputation) is done
//! by the service layer against a [`doclib_entity::hierarchy::TreeIndex`]
//! snapshot; the repositories persist the computed assignments inside one
//! transaction.

use sqlx::PgPool;
use uuid::Uuid;

use doclib_core::error::{AppError, ErrorKind};
use doclib_core::result::AppResult;
use doclib_entity::file::{Translation, TranslationInput};
use doclib_entity::hierarchy::{Category, Department};

/// Repository for the department tree.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Create a new department repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a department by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find department", e))
    }

    /// Load the whole department tree, ordered by depth.
    pub async fn find_all(&self) -> AppResult<Vec<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY depth ASC, name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list departments", e))
    }

    /// Create a department with a precomputed depth.
    pub async fn create(
        &self,
        parent_id: Option<Uuid>,
        name: &str,
        depth: i32,
    ) -> AppResult<Department> {
        sqlx::query_as::<_, Department>(
            "INSERT INTO departments (parent_id, name, depth) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(parent_id)
        .bind(name)
        .bind(depth)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create department", e))
    }

    /// Re-parent a department and persist the recomputed subtree depths
    /// in a single transaction.
    pub async fn reparent(
        &self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        depth_assignments: &[(Uuid, i32)],
    ) -> AppResult<Department> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let department = sqlx::query_as::<_, Department>(
            "UPDATE departments SET parent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_parent_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::not_found(format!("Department {id} not found")))?;

        for (node_id, depth) in depth_assignments {
            sqlx::query("UPDATE departments SET depth = $2, updated_at = NOW() WHERE id = $1")
                .bind(node_id)
                .bind(depth)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(department)
    }

    /// Count file item allow-list rows referencing any of the given
    /// departments. Deletion cascades through a subtree, so the caller
    /// passes the node together with its descendants.
    pub async fn count_file_references(&self, ids: &[Uuid]) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM file_access_departments WHERE department_id = ANY($1)",
        )
            .bind(ids)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count department references", e)
            })
    }

    /// Delete a department. Child departments are removed by the cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete department", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

/// Repository for the category tree.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find category", e))
    }

    /// Load all categories of a section, ordered by depth.
    pub async fn find_by_section(&self, section_id: Uuid) -> AppResult<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE section_id = $1 ORDER BY depth ASC, title ASC",
        )
        .bind(section_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list categories", e))
    }

    /// Create a category with a precomputed depth.
    pub async fn create(
        &self,
        section_id: Uuid,
        parent_id: Option<Uuid>,
        title: &str,
        depth: i32,
    ) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (section_id, parent_id, title, depth) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(section_id)
        .bind(parent_id)
        .bind(title)
        .bind(depth)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create category", e))
    }

    /// Re-parent a category and persist the recomputed subtree depths in
    /// a single transaction.
    pub async fn reparent(
        &self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        depth_assignments: &[(Uuid, i32)],
    ) -> AppResult<Category> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET parent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_parent_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

        for (node_id, depth) in depth_assignments {
            sqlx::query("UPDATE categories SET depth = $2, updated_at = NOW() WHERE id = $1")
                .bind(node_id)
                .bind(depth)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(category)
    }

    /// Count rows filed under a category: file items plus publication
    /// requests, both of which hold a restricting foreign key.
    pub async fn count_file_references(&self, id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM file_items WHERE category_id = $1) \
                  + (SELECT COUNT(*) FROM file_requests WHERE category_id = $1)",
        )
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count category references", e)
            })
    }

    /// Delete a category, detaching its children (the FK sets their
    /// parent to NULL) and persisting the promoted subtree depths, all in
    /// one transaction.
    pub async fn delete_detaching_children(
        &self,
        id: Uuid,
        depth_assignments: &[(Uuid, i32)],
    ) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for (node_id, depth) in depth_assignments {
            sqlx::query("UPDATE categories SET depth = $2, updated_at = NOW() WHERE id = $1")
                .bind(node_id)
                .bind(depth)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the translation set of a category.
    pub async fn replace_translations(
        &self,
        category_id: Uuid,
        translations: &[TranslationInput],
    ) -> AppResult<Vec<Translation>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM category_translations WHERE owner_id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let mut rows = Vec::with_capacity(translations.len());
        for t in translations {
            let row = sqlx::query_as::<_, Translation>(
                "INSERT INTO category_translations (owner_id, lang, title, description) \
                 VALUES ($1, $2, $3, $4) RETURNING *",
            )
            .bind(category_id)
            .bind(&t.lang)
            .bind(&t.title)
            .bind(&t.description)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
            rows.push(row);
        }

        tx.commit().await.map_err(db_err)?;
        Ok(rows)
    }
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, format!("Database error: {e}"), e)
}
