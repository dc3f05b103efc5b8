//! Best-effort event dispatch.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use doclib_core::events::{AuditEvent, EventPayload, RequestResolution};
use doclib_core::traits::audit::AuditSink;
use doclib_core::traits::notify::NotificationSink;

/// Dispatches audit events and request-resolution notifications.
///
/// Dispatch is fire-and-forget: delivery runs on a background task, and
/// a failing sink is logged without failing or rolling back the
/// operation that produced the event.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    audit: Arc<dyn AuditSink>,
    notifications: Option<Arc<dyn NotificationSink>>,
}

impl EventDispatcher {
    /// Create a dispatcher. The notification sink is optional; deploys
    /// without user messaging simply pass `None`.
    pub fn new(
        audit: Arc<dyn AuditSink>,
        notifications: Option<Arc<dyn NotificationSink>>,
    ) -> Self {
        Self {
            audit,
            notifications,
        }
    }

    /// Emit one audit event for a state-changing operation.
    pub fn emit(&self, actor_id: Option<Uuid>, payload: EventPayload) {
        let sink = self.audit.clone();
        let event = AuditEvent::new(actor_id, payload);
        tokio::spawn(async move {
            if let Err(e) = sink.record(&event).await {
                warn!(
                    action = event.action(),
                    entity_id = %event.entity_id(),
                    error = %e,
                    "Audit sink failed"
                );
            }
        });
    }

    /// Notify about a resolved publication request.
    pub fn notify_resolution(&self, resolution: RequestResolution) {
        let Some(sink) = self.notifications.clone() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = sink.request_resolved(&resolution).await {
                warn!(
                    request_id = %resolution.request_id,
                    error = %e,
                    "Notification sink failed"
                );
            }
        });
    }
}
