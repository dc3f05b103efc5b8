//! Notification collaborator trait.

use async_trait::async_trait;

use crate::events::RequestResolution;
use crate::result::AppResult;

/// Informed of publication request resolutions for user-facing messaging.
///
/// Delivery is best-effort; a failure here is non-fatal to the resolution.
#[async_trait]
pub trait NotificationSink: Send + Sync + std::fmt::Debug + 'static {
    /// Notify about a resolved request.
    async fn request_resolved(&self, resolution: &RequestResolution) -> AppResult<()>;
}
