//! Domain events emitted by DocLib operations.
//!
//! Every state-changing operation produces exactly one [`AuditEvent`],
//! dispatched best-effort to the audit collaborator. Request resolutions
//! additionally produce a [`RequestResolution`] for the notification
//! collaborator.

pub mod file;
pub mod hierarchy;
pub mod request;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use file::FileEvent;
pub use hierarchy::HierarchyEvent;
pub use request::{RequestEvent, RequestResolution};

/// Wrapper for all domain events with actor and timing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (absent for anonymous downloads).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A file repository event.
    File(FileEvent),
    /// A publication request event.
    Request(RequestEvent),
    /// A department/category tree event.
    Hierarchy(HierarchyEvent),
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(actor_id: Option<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// A short dotted action name for the audit log (e.g., `"file.delete"`).
    pub fn action(&self) -> &'static str {
        match &self.payload {
            EventPayload::File(e) => e.action(),
            EventPayload::Request(e) => e.action(),
            EventPayload::Hierarchy(e) => e.action(),
        }
    }

    /// The type of the primary entity this event concerns.
    pub fn entity_type(&self) -> &'static str {
        match &self.payload {
            EventPayload::File(_) => "file_item",
            EventPayload::Request(_) => "file_request",
            EventPayload::Hierarchy(e) => e.entity_type(),
        }
    }

    /// The ID of the primary entity this event concerns.
    pub fn entity_id(&self) -> Uuid {
        match &self.payload {
            EventPayload::File(e) => e.entity_id(),
            EventPayload::Request(e) => e.entity_id(),
            EventPayload::Hierarchy(e) => e.entity_id(),
        }
    }
}
