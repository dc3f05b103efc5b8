//! Database-backed audit sink and audit log queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use doclib_core::error::{AppError, ErrorKind};
use doclib_core::events::AuditEvent;
use doclib_core::result::AppResult;
use doclib_core::traits::audit::AuditSink;
use doclib_core::types::pagination::{PageRequest, PageResponse};

use super::file::db_err;

/// A persisted audit log row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Row ID.
    pub id: Uuid,
    /// The user who caused the event, if known.
    pub actor_id: Option<Uuid>,
    /// Dotted action name, e.g. `"request.approve"`.
    pub action: String,
    /// Type of the primary entity.
    pub entity_type: String,
    /// ID of the primary entity.
    pub entity_id: Uuid,
    /// The full serialized event payload.
    pub details: Option<Value>,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

/// Audit sink that appends events to the `audit_log` table.
#[derive(Debug, Clone)]
pub struct DatabaseAuditSink {
    pool: PgPool,
}

impl DatabaseAuditSink {
    /// Create a new database-backed audit sink.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List audit entries for one entity, newest first.
    pub async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_log WHERE entity_type = $1 AND entity_id = $2",
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count audit log", e))?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log WHERE entity_type = $1 AND entity_id = $2 \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query audit log", e))?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}

#[async_trait]
impl AuditSink for DatabaseAuditSink {
    async fn record(&self, event: &AuditEvent) -> AppResult<()> {
        let details = serde_json::to_value(&event.payload)?;
        sqlx::query(
            "INSERT INTO audit_log (id, actor_id, action, entity_type, entity_id, details, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(event.id)
        .bind(event.actor_id)
        .bind(event.action())
        .bind(event.entity_type())
        .bind(event.entity_id())
        .bind(details)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_entries_serialize_in_pages() {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            actor_id: Some(Uuid::new_v4()),
            action: "request.approve".to_string(),
            entity_type: "file_request".to_string(),
            entity_id: Uuid::new_v4(),
            details: Some(serde_json::json!({"domain": "request"})),
            created_at: Utc::now(),
        };

        let page = PageResponse::new(vec![entry], 1, 20, 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["items"][0]["action"], "request.approve");
        assert_eq!(json["total_items"], 1);
    }
}
