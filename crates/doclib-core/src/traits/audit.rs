//! Audit collaborator trait.

use async_trait::async_trait;

use crate::events::AuditEvent;
use crate::result::AppResult;

/// Receives one event per state-changing operation.
///
/// Dispatch is fire-and-forget: a failing sink is logged by the caller
/// and never rolls back the primary operation.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Record an audit event.
    async fn record(&self, event: &AuditEvent) -> AppResult<()>;
}
