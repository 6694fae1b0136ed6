//! CLI-based slideshow renderer using gallery-dl and ffmpeg

use super::traits::SlideshowRenderer;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Share URL template accepted by the asset downloader for slideshow posts
const SHARE_URL_TEMPLATE: &str = "https://www.tiktok.com/share/video/";

/// Per-image display interval bounds in seconds
const MIN_INTERVAL_SECS: f64 = 2.0;
const MAX_INTERVAL_SECS: f64 = 3.0;

/// CLI-based renderer driving external `gallery-dl`, `ffprobe` and `ffmpeg`
///
/// Pipeline per post: clear the scratch directory, pull the post's images
/// and audio with gallery-dl, probe the audio duration, render a 1080x1920
/// letterboxed 30 fps video with each image shown for 2-3 seconds, then
/// copy the result next to the regular downloads as `<id>.mp4`.
///
/// Every failure is logged and reported as `false`; this collaborator
/// never raises.
pub struct CliSlideshowRenderer {
    gallery_dl_path: PathBuf,
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
    tmp_dir: PathBuf,
    downloads_dir: PathBuf,
}

impl CliSlideshowRenderer {
    /// Create a renderer with explicit binary paths
    pub fn new(
        gallery_dl_path: PathBuf,
        ffmpeg_path: PathBuf,
        ffprobe_path: PathBuf,
        tmp_dir: PathBuf,
        downloads_dir: PathBuf,
    ) -> Self {
        Self {
            gallery_dl_path,
            ffmpeg_path,
            ffprobe_path,
            tmp_dir,
            downloads_dir,
        }
    }

    /// Attempt to find gallery-dl, ffmpeg and ffprobe in PATH
    ///
    /// Returns `None` if any of the three binaries is missing.
    pub fn from_path(tmp_dir: PathBuf, downloads_dir: PathBuf) -> Option<Self> {
        let gallery_dl = which::which("gallery-dl").ok()?;
        let ffmpeg = which::which("ffmpeg").ok()?;
        let ffprobe = which::which("ffprobe").ok()?;
        Some(Self::new(gallery_dl, ffmpeg, ffprobe, tmp_dir, downloads_dir))
    }

    /// Empty and recreate the scratch directory
    async fn reset_tmp_dir(&self) -> crate::Result<()> {
        if tokio::fs::try_exists(&self.tmp_dir).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&self.tmp_dir).await?;
        }
        tokio::fs::create_dir_all(&self.tmp_dir).await?;
        Ok(())
    }

    /// Download the post's images and audio into the scratch directory
    async fn fetch_assets(&self, video_id: &str) -> crate::Result<()> {
        let output = Command::new(&self.gallery_dl_path)
            .arg("-D")
            .arg(&self.tmp_dir)
            .arg(format!("{SHARE_URL_TEMPLATE}{video_id}"))
            .output()
            .await
            .map_err(|e| {
                crate::Error::ExternalTool(format!("Failed to execute gallery-dl: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(crate::Error::ExternalTool(stderr.trim().to_string()));
        }
        Ok(())
    }

    /// Normalize downloaded assets to the names the ffmpeg invocation expects
    ///
    /// Images become `0.jpg`, `1.jpg`, ... in sorted order; the first audio
    /// track becomes `audio.mp3`. Returns the image count.
    async fn normalize_assets(&self) -> crate::Result<usize> {
        let mut images = Vec::new();
        let mut audio = None;

        let mut entries = tokio::fs::read_dir(&self.tmp_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match path.extension().and_then(|e| e.to_str()) {
                Some("jpg" | "jpeg" | "webp") => images.push(path),
                Some("mp3" | "m4a") if audio.is_none() => audio = Some(path),
                _ => {}
            }
        }
        images.sort();

        let Some(audio) = audio else {
            return Err(crate::Error::Other("no audio track was found".to_string()));
        };
        if images.is_empty() {
            return Err(crate::Error::Other("no images were found".to_string()));
        }

        for (i, path) in images.iter().enumerate() {
            tokio::fs::rename(path, self.tmp_dir.join(format!("{i}.jpg"))).await?;
        }
        tokio::fs::rename(&audio, self.tmp_dir.join("audio.mp3")).await?;

        Ok(images.len())
    }

    /// Probe the audio track's duration in seconds
    async fn audio_duration_secs(&self) -> crate::Result<f64> {
        let output = Command::new(&self.ffprobe_path)
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(self.tmp_dir.join("audio.mp3"))
            .output()
            .await
            .map_err(|e| {
                crate::Error::ExternalTool(format!("Failed to execute ffprobe: {}", e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.trim().parse::<f64>().map_err(|e| {
            crate::Error::ExternalTool(format!("Failed to parse audio duration: {}", e))
        })
    }

    /// Render the normalized assets into `output.mp4` in the scratch dir
    async fn render_video(&self, image_count: usize, sound_len: f64) -> crate::Result<()> {
        // Interval per image clamped to [2, 3] seconds; the video runs at
        // least as long as the audio so the track is never cut off
        let interval = (sound_len / image_count as f64)
            .clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
        let total_len = (interval * image_count as f64).max(sound_len);
        let input_fps = 1.0 / interval;

        tracing::debug!(
            image_count,
            sound_len,
            interval,
            total_len,
            "Rendering slideshow"
        );

        // Vertical 1080x1920 canvas, aspect preserved, letterboxed
        let vf = "scale=iw*min(1080/iw\\,1920/ih):ih*min(1080/iw\\,1920/ih),\
                  pad=1080:1920:(1080-iw*min(1080/iw\\,1920/ih))/2:(1920-ih*min(1080/iw\\,1920/ih))/2,\
                  format=yuv420p";

        let output = Command::new(&self.ffmpeg_path)
            .arg("-framerate")
            .arg(format!("{input_fps}"))
            .arg("-i")
            .arg(self.tmp_dir.join("%01d.jpg"))
            .arg("-i")
            .arg(self.tmp_dir.join("audio.mp3"))
            .arg("-vf")
            .arg(vf)
            .arg("-r")
            .arg("30")
            .arg("-acodec")
            .arg("aac")
            .arg("-t")
            .arg(format!("{total_len}"))
            .arg(self.tmp_dir.join("output.mp4"))
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(crate::Error::ExternalTool(stderr.trim().to_string()));
        }
        Ok(())
    }

    async fn render_inner(&self, video_id: &str) -> crate::Result<()> {
        self.reset_tmp_dir().await?;
        self.fetch_assets(video_id).await?;
        let image_count = self.normalize_assets().await?;
        let sound_len = self.audio_duration_secs().await?;
        self.render_video(image_count, sound_len).await?;

        tokio::fs::create_dir_all(&self.downloads_dir).await?;
        tokio::fs::copy(
            self.tmp_dir.join("output.mp4"),
            self.downloads_dir.join(format!("{video_id}.mp4")),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SlideshowRenderer for CliSlideshowRenderer {
    async fn render(&self, video_id: &str) -> bool {
        tracing::info!(video_id, "Processing slideshow");
        match self.render_inner(video_id).await {
            Ok(()) => {
                tracing::info!(video_id, "Slideshow saved");
                true
            }
            Err(e) => {
                tracing::warn!(video_id, error = %e, "Slideshow rendering failed");
                false
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_renderer(tmp: &std::path::Path) -> CliSlideshowRenderer {
        CliSlideshowRenderer::new(
            PathBuf::from("/usr/bin/gallery-dl"),
            PathBuf::from("/usr/bin/ffmpeg"),
            PathBuf::from("/usr/bin/ffprobe"),
            tmp.join("scratch"),
            tmp.join("downloads"),
        )
    }

    #[tokio::test]
    async fn normalize_orders_images_and_picks_audio() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = scratch_renderer(dir.path());
        renderer.reset_tmp_dir().await.unwrap();

        for name in ["b.jpg", "a.jpg", "c.jpg", "track.mp3"] {
            tokio::fs::write(renderer.tmp_dir.join(name), b"x").await.unwrap();
        }

        let count = renderer.normalize_assets().await.unwrap();
        assert_eq!(count, 3);
        for name in ["0.jpg", "1.jpg", "2.jpg", "audio.mp3"] {
            assert!(
                renderer.tmp_dir.join(name).exists(),
                "{name} should exist after normalization"
            );
        }
    }

    #[tokio::test]
    async fn normalize_fails_without_images_or_audio() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = scratch_renderer(dir.path());
        renderer.reset_tmp_dir().await.unwrap();

        tokio::fs::write(renderer.tmp_dir.join("only.mp3"), b"x").await.unwrap();
        assert!(renderer.normalize_assets().await.is_err());

        renderer.reset_tmp_dir().await.unwrap();
        tokio::fs::write(renderer.tmp_dir.join("only.jpg"), b"x").await.unwrap();
        assert!(renderer.normalize_assets().await.is_err());
    }

    #[tokio::test]
    async fn reset_tmp_dir_clears_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = scratch_renderer(dir.path());
        renderer.reset_tmp_dir().await.unwrap();
        tokio::fs::write(renderer.tmp_dir.join("stale.jpg"), b"x").await.unwrap();

        renderer.reset_tmp_dir().await.unwrap();
        assert!(!renderer.tmp_dir.join("stale.jpg").exists());
        assert!(renderer.tmp_dir.exists());
    }

    #[test]
    fn interval_clamps_to_bounds() {
        // Short audio over many images clamps to the 2s floor; long audio
        // over few images clamps to the 3s ceiling
        assert_eq!((4.0f64 / 10.0).clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS), 2.0);
        assert_eq!((60.0f64 / 3.0).clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS), 3.0);
        let mid = (12.5f64 / 5.0).clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
        assert!((mid - 2.5).abs() < f64::EPSILON);
    }
}
