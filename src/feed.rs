//! Bulk liked-listing collaborator
//!
//! Seam for the browser-automation service that enumerates a user's liked
//! items newest-first. Only the interface lives here; implementations are
//! the consumer's concern (they typically wrap a headless browser or a
//! platform API client).

use crate::types::LikedItem;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Trait for listing a user's liked/favorited items
///
/// The stream yields items newest-first; the import path stops consuming
/// once it has seen a window of already-known ids, so implementations
/// should produce items lazily rather than buffering the full history.
#[async_trait]
pub trait LikedFeed: Send + Sync {
    /// Open a stream of the user's liked items, newest first
    ///
    /// # Errors
    ///
    /// Returns an error when the listing session cannot be established.
    /// Item-level failures are reported through the stream.
    async fn list_liked(&self, user: &str)
    -> crate::Result<BoxStream<'static, crate::Result<LikedItem>>>;
}
