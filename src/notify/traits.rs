//! Trait for the notification gateway

use crate::db::Video;
use crate::types::MessageId;
use async_trait::async_trait;

/// Trait for sending and retiring removal notifications
///
/// Both operations degrade instead of failing: `None`/`false` results mean
/// "not delivered this time" and the caller leaves the record in a state
/// that retries on the next pass. Implementations log their own failures.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Announce that a previously archived video disappeared at the source
    ///
    /// Returns an opaque handle to the delivered notification, or `None`
    /// when delivery failed (unconfigured gateway, transport error,
    /// rejected request).
    async fn notify_removed(&self, video: &Video) -> Option<MessageId>;

    /// Retire an outstanding removal notification after a restoration
    ///
    /// Returns true when the notification was successfully edited/retired.
    async fn retire_notification(&self, handle: MessageId, video: &Video) -> bool;
}
