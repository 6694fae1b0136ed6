//! Download orchestration: single attempts and the batch pass.

use crate::retry::{ProbeError, probe_with_retry};
use crate::types::{DownloadOutcome, DownloadReport, MediaType, VideoStatus};

use super::Archiver;

impl Archiver {
    /// Attempt to download one video and commit the resulting state
    ///
    /// Transient network failures leave the record byte-for-byte untouched
    /// (`NetworkSkipped`); terminal failures commit `failed`; successes
    /// commit `success` with name/author/media type. An audio-only payload
    /// is a slideshow candidate: the renderer runs first, and only its
    /// outcome decides between `success` (slideshow) and a revert to `new`.
    pub async fn download_video(&self, video_id: &str) -> crate::Result<DownloadOutcome> {
        let max_retries = self.config.fetch.max_retries;
        let result =
            probe_with_retry(max_retries, || self.fetcher.fetch(video_id, true)).await;

        let info = match result {
            Ok(info) => info,
            Err(ProbeError::Transient { attempts, message }) => {
                tracing::warn!(video_id, attempts, message, "Network error, record untouched");
                return Ok(DownloadOutcome::NetworkSkipped);
            }
            Err(ProbeError::Terminal(e)) => {
                tracing::warn!(video_id, error = %e, "Download failed");
                if !self.db.record_download_failure(video_id).await? {
                    tracing::debug!(video_id, "Record vanished before commit, discarding");
                }
                return Ok(DownloadOutcome::Failed);
            }
        };

        let name = info
            .description
            .clone()
            .unwrap_or_else(|| format!("Video {video_id}"));
        let author = info.uploader.as_deref();

        if info.is_audio_only() {
            // Render before committing anything so exactly one atomic row
            // update happens for this attempt
            if self.renderer.render(video_id).await {
                self.db
                    .record_download_success(video_id, &name, author, MediaType::Slideshow)
                    .await?;
                Ok(DownloadOutcome::Success)
            } else {
                // Back to `new`: a later pass retries acquisition
                self.db.record_download_deferred(video_id).await?;
                Ok(DownloadOutcome::Failed)
            }
        } else {
            if !self
                .db
                .record_download_success(video_id, &name, author, MediaType::Video)
                .await?
            {
                tracing::debug!(video_id, "Record vanished before commit, discarding");
            }
            Ok(DownloadOutcome::Success)
        }
    }

    /// Download every pending record, strictly sequentially
    ///
    /// Processes all `new` records, plus `failed` ones when hope mode is
    /// enabled. A failure on one record never aborts the pass.
    pub async fn run_download_pass(&self) -> crate::Result<DownloadReport> {
        tokio::fs::create_dir_all(self.config.downloads_dir()).await?;

        let mut queue = self.db.list_videos(Some(VideoStatus::New)).await?;
        if self.config.fetch.hope_mode {
            tracing::info!(
                "Hope mode is enabled, will also retry failed videos. This may take a while."
            );
            queue.extend(self.db.list_videos(Some(VideoStatus::Failed)).await?);
        }

        tracing::info!(
            count = queue.len(),
            hope_mode = self.config.fetch.hope_mode,
            "Found videos to download"
        );

        let mut report = DownloadReport {
            attempted: queue.len() as u64,
            ..Default::default()
        };

        if queue.is_empty() {
            return Ok(report);
        }

        for (i, video) in queue.iter().enumerate() {
            tracing::info!(
                video_id = %video.id,
                progress = format!("{}/{}", i + 1, queue.len()),
                "Downloading video"
            );

            match self.download_video(&video.id).await {
                Ok(DownloadOutcome::Success) => {
                    report.succeeded += 1;
                    tracing::info!(video_id = %video.id, "Successfully downloaded video");
                }
                Ok(DownloadOutcome::Failed) => {
                    report.failed += 1;
                    tracing::warn!(video_id = %video.id, "Failed to download video");
                }
                Ok(DownloadOutcome::NetworkSkipped) => {
                    report.network_skipped += 1;
                }
                Err(e) => {
                    // Storage-level trouble for this record; keep going
                    report.failed += 1;
                    tracing::error!(video_id = %video.id, error = %e, "Download attempt errored");
                }
            }
        }

        report.remaining_new = self.db.list_videos(Some(VideoStatus::New)).await?.len() as u64;

        tracing::info!(
            succeeded = report.succeeded,
            attempted = report.attempted,
            remaining_new = report.remaining_new,
            "Download pass finished"
        );
        if self.config.fetch.hope_mode {
            tracing::info!("Don't forget to disable hope mode in the configuration!");
        }

        Ok(report)
    }
}
