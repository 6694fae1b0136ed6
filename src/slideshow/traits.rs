//! Trait for slideshow rendering

use async_trait::async_trait;

/// Trait for rendering a multi-image post into an archivable video
///
/// Implementations report success with a plain flag and never raise: a
/// failed render means the record goes back to `new` and a later download
/// pass retries acquisition.
#[async_trait]
pub trait SlideshowRenderer: Send + Sync {
    /// Fetch the post's assets and render them into a local video file
    ///
    /// Returns true when the rendered video was materialized.
    async fn render(&self, video_id: &str) -> bool;
}
