//! Availability checking: batch sizing and the per-record state machine.

use crate::db::Video;
use crate::retry::{ProbeError, probe_with_retry};
use crate::types::{CheckReport, VideoStatus};

use super::Archiver;

/// What happened to one record during an availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Still available; `last_checked` advanced
    Available,
    /// Disappearance observed on a `success` record
    Unavailable,
    /// Already `deleted` and still gone; `last_checked` advanced
    StillGone,
    /// Restoration committed (`deleted` back to `success`)
    Restored,
    /// Restoration observed but the old notification could not be retired;
    /// nothing touched, retried next pass
    HeldBack,
    /// Transient network error; nothing touched
    NetworkSkipped,
}

impl Archiver {
    /// Batch size for one hourly invocation
    ///
    /// `ceil(total / interval_days / 24)`: one full sweep of the archive is
    /// amortized over the configured interval regardless of its size.
    pub fn check_batch_size(total: u64, interval_days: u32) -> u64 {
        let hours = u64::from(interval_days.max(1)) * 24;
        total.div_ceil(hours)
    }

    /// Probe one availability-check batch and commit the transitions
    ///
    /// Selects the least-recently-checked eligible records and runs each
    /// through the state machine. A failure on one record never aborts the
    /// batch.
    pub async fn check_availability_batch(&self) -> crate::Result<CheckReport> {
        let total = self.db.count_checkable().await?;
        if total == 0 {
            tracing::info!("No videos to check");
            return Ok(CheckReport::default());
        }

        let batch_size =
            Self::check_batch_size(total, self.config.check.check_interval_days);
        tracing::info!(batch_size, total, "Checking availability batch");

        let mut report = CheckReport {
            total,
            batch_size,
            ..Default::default()
        };

        for video in self.db.select_check_batch(batch_size).await? {
            tracing::info!(
                video_id = %video.id,
                name = video.name.as_deref().unwrap_or("Unknown"),
                "Checking video"
            );

            match self.check_video(&video).await {
                Ok(Disposition::Available) | Ok(Disposition::StillGone) => {
                    report.checked += 1;
                }
                Ok(Disposition::Unavailable) => {
                    report.checked += 1;
                    report.unavailable += 1;
                }
                Ok(Disposition::Restored) => {
                    report.checked += 1;
                    report.restored += 1;
                }
                Ok(Disposition::HeldBack) | Ok(Disposition::NetworkSkipped) => {
                    report.skipped += 1;
                }
                Err(e) => {
                    report.skipped += 1;
                    tracing::error!(video_id = %video.id, error = %e, "Check errored");
                }
            }
        }

        tracing::info!(
            checked = report.checked,
            unavailable = report.unavailable,
            restored = report.restored,
            skipped = report.skipped,
            "Availability batch finished"
        );

        Ok(report)
    }

    /// Drive one record through the availability state machine
    async fn check_video(&self, video: &Video) -> crate::Result<Disposition> {
        let max_retries = self.config.fetch.max_retries;
        let probe = probe_with_retry(max_retries, || self.fetcher.fetch(&video.id, false)).await;

        match (probe, video.status()) {
            // Transient trouble: skip the record entirely, no field updated
            (Err(ProbeError::Transient { .. }), _) => {
                tracing::warn!(video_id = %video.id, "Encountered a network error, skipping");
                Ok(Disposition::NetworkSkipped)
            }

            // Available and not marked deleted: just advance last_checked
            (Ok(_), VideoStatus::Success | VideoStatus::New | VideoStatus::Failed) => {
                self.db.touch_checked(&video.id).await?;
                Ok(Disposition::Available)
            }

            // Restoration: the source has the content again
            (Ok(_), VideoStatus::Deleted) => {
                tracing::info!(video_id = %video.id, "Video is available again");
                if let Some(handle) = video.message_id {
                    if !self.gateway.retire_notification(handle, video).await {
                        // Keep the record exactly as it is so the next pass
                        // retries the retirement
                        tracing::warn!(
                            video_id = %video.id,
                            "Could not retire notification, holding record back"
                        );
                        return Ok(Disposition::HeldBack);
                    }
                }
                self.db.mark_restored(&video.id).await?;
                Ok(Disposition::Restored)
            }

            // Disappearance observed on an archived record
            (Err(ProbeError::Terminal(e)), VideoStatus::Success) => {
                let reason = e.to_string();
                tracing::warn!(video_id = %video.id, reason, "Video is no longer available");

                match self.gateway.notify_removed(video).await {
                    Some(handle) => {
                        self.db.mark_deleted(&video.id, handle, &reason).await?;
                    }
                    None => {
                        // Hold the status at `success` so the next pass
                        // retries the notification, but keep the diagnosis
                        // and the probe timestamp
                        self.db.record_pending_removal(&video.id, &reason).await?;
                    }
                }
                Ok(Disposition::Unavailable)
            }

            // Already deleted and still gone
            (Err(ProbeError::Terminal(_)), VideoStatus::Deleted) => {
                self.db.touch_checked(&video.id).await?;
                Ok(Disposition::StillGone)
            }

            // `new`/`failed` records are not selected for checks; if one
            // slips through, treat the terminal probe like a completed check
            (Err(ProbeError::Terminal(_)), _) => {
                self.db.touch_checked(&video.id).await?;
                Ok(Disposition::StillGone)
            }
        }
    }
}
