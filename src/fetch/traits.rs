//! Traits and types for the media fetch/probe collaborator

use async_trait::async_trait;
use serde::Deserialize;

/// Format marker the extractor reports for audio-only payloads
///
/// A "video" that resolves to bare audio is a multi-image slideshow post;
/// the orchestrator hands those to the slideshow renderer.
pub const AUDIO_FORMAT_ID: &str = "audio";

/// Metadata returned by a fetch or probe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    /// Post description, used as the archived name
    #[serde(default)]
    pub description: Option<String>,

    /// Author handle as reported by the source
    #[serde(default)]
    pub uploader: Option<String>,

    /// Selected format identifier; `"audio"` marks a slideshow candidate
    #[serde(default)]
    pub format_id: Option<String>,
}

impl MediaInfo {
    /// True when the payload resolved to bare audio (slideshow candidate)
    pub fn is_audio_only(&self) -> bool {
        self.format_id.as_deref() == Some(AUDIO_FORMAT_ID)
    }
}

/// Trait for fetching and probing source-platform videos
///
/// A single operation serves both paths: with `download = true` the
/// implementation materializes a local media file as a side effect; with
/// `download = false` it only verifies that the content is retrievable.
///
/// Errors must carry the underlying tool's message so the retry layer can
/// separate transient network trouble from content-level failure.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch metadata for a video, optionally downloading the media
    ///
    /// # Errors
    ///
    /// Returns an error when the content cannot be retrieved, for any
    /// reason - classification happens in the retry layer, not here.
    async fn fetch(&self, video_id: &str, download: bool) -> crate::Result<MediaInfo>;
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_format_marks_slideshow_candidate() {
        let info = MediaInfo {
            format_id: Some("audio".to_string()),
            ..Default::default()
        };
        assert!(info.is_audio_only());

        let info = MediaInfo {
            format_id: Some("bytevc1_1080p".to_string()),
            ..Default::default()
        };
        assert!(!info.is_audio_only());

        assert!(!MediaInfo::default().is_audio_only());
    }

    #[test]
    fn media_info_deserializes_from_extractor_json() {
        let info: MediaInfo = serde_json::from_str(
            r#"{
                "description": "a cat",
                "uploader": "alice",
                "format_id": "audio",
                "duration": 13.4
            }"#,
        )
        .unwrap();

        assert_eq!(info.description.as_deref(), Some("a cat"));
        assert_eq!(info.uploader.as_deref(), Some("alice"));
        assert!(info.is_audio_only());
    }
}
