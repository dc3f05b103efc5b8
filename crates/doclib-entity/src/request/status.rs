//! Publication request status state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a publication request.
///
/// `Pending` is the only non-terminal state; a resolved request is
/// immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting moderation.
    Pending,
    /// Promoted into the file repository.
    Approved,
    /// Declined by an approver.
    Rejected,
    /// Withdrawn by the submitter.
    Canceled,
}

impl RequestStatus {
    /// Whether the request can still change state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether a transition to `next` is legal. Only
    /// `Pending -> {Approved, Rejected, Canceled}` exists.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(self, Self::Pending) && next != Self::Pending
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = doclib_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "canceled" => Ok(Self::Canceled),
            _ => Err(doclib_core::AppError::validation(format!(
                "Invalid request status: '{s}'. Expected one of: pending, approved, rejected, canceled"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_is_only_live_state() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_legal_transitions() {
        for next in [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Canceled,
        ] {
            assert!(RequestStatus::Pending.can_transition_to(next));
        }
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        for from in [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Canceled,
        ] {
            for next in [
                RequestStatus::Pending,
                RequestStatus::Approved,
                RequestStatus::Rejected,
                RequestStatus::Canceled,
            ] {
                assert!(!from.can_transition_to(next));
            }
        }
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Pending));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "pending".parse::<RequestStatus>().unwrap(),
            RequestStatus::Pending
        );
        assert!("done".parse::<RequestStatus>().is_err());
    }
}
