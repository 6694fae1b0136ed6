//! Stub slideshow renderer for deployments without the external tools

use super::traits::SlideshowRenderer;
use async_trait::async_trait;

/// Stub renderer that reports failure for every slideshow
///
/// With this implementation, audio-only payloads stay `new` and are
/// retried on later passes; installing the external tools later lets the
/// queue drain without manual status edits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSlideshowRenderer;

#[async_trait]
impl SlideshowRenderer for NoOpSlideshowRenderer {
    async fn render(&self, video_id: &str) -> bool {
        tracing::warn!(
            video_id,
            "Slideshow rendering unavailable (no-op renderer configured)"
        );
        false
    }
}
