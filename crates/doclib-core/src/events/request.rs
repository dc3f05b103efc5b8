//! Publication request domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to the publication request workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestEvent {
    /// A request was submitted.
    Submitted {
        /// The request ID.
        request_id: Uuid,
        /// `"new"` or `"update"`.
        request_type: String,
    },
    /// A staged asset was uploaded to a pending request.
    AssetStaged {
        /// The request ID.
        request_id: Uuid,
        /// The staged asset language.
        lang: String,
    },
    /// A request was approved and promoted into the repository.
    Approved {
        /// The request ID.
        request_id: Uuid,
        /// The file item the staged content was promoted into.
        file_item_id: Uuid,
        /// The version created from the staged content.
        version_id: Uuid,
    },
    /// A request was rejected by an approver.
    Rejected {
        /// The request ID.
        request_id: Uuid,
    },
    /// A request was canceled by its submitter.
    Canceled {
        /// The request ID.
        request_id: Uuid,
    },
}

impl RequestEvent {
    /// Dotted action name for the audit log.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "request.submit",
            Self::AssetStaged { .. } => "request.asset.stage",
            Self::Approved { .. } => "request.approve",
            Self::Rejected { .. } => "request.reject",
            Self::Canceled { .. } => "request.cancel",
        }
    }

    /// The request this event concerns.
    pub fn entity_id(&self) -> Uuid {
        match self {
            Self::Submitted { request_id, .. }
            | Self::AssetStaged { request_id, .. }
            | Self::Approved { request_id, .. }
            | Self::Rejected { request_id }
            | Self::Canceled { request_id } => *request_id,
        }
    }
}

/// Outcome of a resolved request, delivered to the notification
/// collaborator so the submitter can be messaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResolution {
    /// The resolved request.
    pub request_id: Uuid,
    /// The user who submitted the request.
    pub submitter_id: Uuid,
    /// Whether the request was approved.
    pub approved: bool,
    /// Approver-supplied reason when rejected.
    pub rejection_reason: Option<String>,
    /// The file item the content landed in, when approved.
    pub file_item_id: Option<Uuid>,
}
