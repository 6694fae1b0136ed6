//! CLI-based media fetcher using the external yt-dlp binary

use super::traits::{MediaFetcher, MediaInfo};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// URL template understood by the extractor; the account handle is not
/// needed to resolve a video by id.
const VIDEO_URL_TEMPLATE: &str = "https://www.tiktok.com/@/video/";

/// CLI-based media fetcher driving the external `yt-dlp` binary
///
/// Probes run with `--skip-download`; downloads select the best format and
/// write `<downloads_dir>/<id>.mp4`. Either way the extractor's JSON output
/// is parsed into [`MediaInfo`].
///
/// # Examples
///
/// ```no_run
/// use likevault::fetch::{MediaFetcher, YtDlpFetcher};
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = YtDlpFetcher::from_path(PathBuf::from("./downloads"), false)
///     .expect("yt-dlp not found in PATH");
///
/// // Probe only
/// let info = fetcher.fetch("7311000000000000001", false).await?;
/// println!("still available: {:?}", info.description);
/// # Ok(())
/// # }
/// ```
pub struct YtDlpFetcher {
    binary_path: PathBuf,
    downloads_dir: PathBuf,
    /// Impersonate a real browser to get past anti-bot checks
    anti_bot: bool,
}

impl YtDlpFetcher {
    /// Create a new fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf, downloads_dir: PathBuf, anti_bot: bool) -> Self {
        Self {
            binary_path,
            downloads_dir,
            anti_bot,
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Returns `Some(YtDlpFetcher)` if the binary is found, `None` otherwise.
    pub fn from_path(downloads_dir: PathBuf, anti_bot: bool) -> Option<Self> {
        which::which("yt-dlp")
            .ok()
            .map(|bin| Self::new(bin, downloads_dir, anti_bot))
    }

    /// Local path a download for this id materializes to
    pub fn media_path(&self, video_id: &str) -> PathBuf {
        self.downloads_dir.join(format!("{video_id}.mp4"))
    }

    fn build_command(&self, video_id: &str, download: bool) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("--dump-single-json").arg("--no-warnings");

        if download {
            cmd.arg("--no-simulate")
                .arg("-f")
                .arg("best")
                .arg("-o")
                .arg(self.media_path(video_id));
        } else {
            cmd.arg("--skip-download");
        }

        if self.anti_bot {
            cmd.arg("--impersonate").arg("chrome");
        }

        cmd.arg(format!("{VIDEO_URL_TEMPLATE}{video_id}"));
        cmd
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, video_id: &str, download: bool) -> crate::Result<MediaInfo> {
        if download {
            tokio::fs::create_dir_all(&self.downloads_dir).await?;
        }

        let output = self
            .build_command(video_id, download)
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            // Surface stderr verbatim: the retry layer matches transient
            // network signatures against this text
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(crate::Error::ExternalTool(stderr.trim().to_string()));
        }

        let info: MediaInfo = serde_json::from_slice(&output.stdout)?;

        tracing::debug!(
            video_id,
            download,
            format_id = info.format_id.as_deref(),
            "yt-dlp fetch completed"
        );

        Ok(info)
    }
}
