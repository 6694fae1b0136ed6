//! Background schedule task for time-based automation
//!
//! This module provides the background task that drives the archive on the
//! wall clock: availability checks at the top of every hour, feed import and
//! downloads at half past.
//!
//! # Features
//!
//! - Minute-level slot evaluation with deduplication per slot
//! - Per-pass error isolation (a failed pass never kills the task)
//! - Graceful shutdown handling
//!
//! # Example
//!
//! ```no_run
//! use likevault::{Archiver, Config};
//! use likevault::fetch::YtDlpFetcher;
//! use likevault::notify::TelegramNotifier;
//! use likevault::schedule::ScheduleTask;
//! use likevault::slideshow::NoOpSlideshowRenderer;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let fetcher = YtDlpFetcher::from_path(config.downloads_dir().clone(), false)
//!     .ok_or("yt-dlp not found in PATH")?;
//! let gateway = TelegramNotifier::new(
//!     config.telegram.bot_token.clone(),
//!     config.telegram.chat_id.clone(),
//!     config.downloads_dir().clone(),
//! );
//! let archiver = Arc::new(
//!     Archiver::new(
//!         config,
//!         Arc::new(fetcher),
//!         Arc::new(NoOpSlideshowRenderer),
//!         Arc::new(gateway),
//!     )
//!     .await?,
//! );
//!
//! let task = ScheduleTask::new(archiver.clone());
//!
//! // Run schedule task (blocks until shutdown)
//! tokio::spawn(async move {
//!     task.run().await;
//! });
//! # Ok(())
//! # }
//! ```

use crate::Archiver;
use crate::feed::LikedFeed;
use chrono::{Local, Timelike};
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info};

/// Minute of the hour at which availability checks run
const CHECK_MINUTE: u32 = 0;

/// Minute of the hour at which feed import and downloads run
const IMPORT_MINUTE: u32 = 30;

/// Seconds until the top of the next minute
///
/// Always in `1..=60`, so the loop wakes on (or just after) each minute
/// boundary instead of drifting past slot minutes.
fn secs_until_next_minute(now: &impl Timelike) -> u64 {
    60 - u64::from(now.second().min(59))
}

/// Background task that drives checks, imports, and downloads on a schedule
///
/// The task wakes every minute. At minute 0 it runs one availability-check
/// batch; at minute 30 it imports fresh items from the liked feed (when a
/// feed is attached and a user handle is configured) and then runs a
/// download pass. The two slots are offset so a long download pass and the
/// next check batch do not contend for the fetcher.
pub struct ScheduleTask {
    /// Reference to the archiver for running passes and checking shutdown
    archiver: Arc<Archiver>,

    /// Optional liked-feed collaborator for incremental imports
    feed: Option<Arc<dyn LikedFeed>>,
}

impl ScheduleTask {
    /// Creates a schedule task without a liked-feed collaborator
    ///
    /// The import slot then only runs download passes.
    pub fn new(archiver: Arc<Archiver>) -> Self {
        Self {
            archiver,
            feed: None,
        }
    }

    /// Attach a liked-feed collaborator for the import slot
    pub fn with_feed(mut self, feed: Arc<dyn LikedFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Starts the schedule task
    ///
    /// Runs in a loop waking at each minute boundary until the archiver
    /// signals shutdown. Each wake-up fires at most one slot, and a slot
    /// never fires twice for the same wall-clock minute.
    pub async fn run(self) {
        info!("Schedule task started");

        // Last (hour, minute) slot that fired, to dedupe within a minute
        let mut last_fired: Option<(u32, u32)> = None;

        loop {
            if self.archiver.is_shutting_down() {
                info!("Schedule task shutting down");
                break;
            }

            let now = Local::now();
            let slot = (now.hour(), now.minute());

            if last_fired != Some(slot) {
                match now.minute() {
                    CHECK_MINUTE => {
                        last_fired = Some(slot);
                        self.run_check_slot().await;
                    }
                    IMPORT_MINUTE => {
                        last_fired = Some(slot);
                        self.run_import_slot().await;
                    }
                    _ => {
                        debug!(minute = now.minute(), "No slot scheduled for this minute");
                    }
                }
            }

            sleep(Duration::from_secs(secs_until_next_minute(&Local::now()))).await;
        }

        info!("Schedule task stopped");
    }

    async fn run_check_slot(&self) {
        info!("Running scheduled availability check");
        match self.archiver.check_availability_batch().await {
            Ok(report) => {
                debug!(
                    checked = report.checked,
                    unavailable = report.unavailable,
                    restored = report.restored,
                    "Scheduled check finished"
                );
            }
            Err(e) => {
                error!(error = %e, "Scheduled availability check failed");
            }
        }
    }

    async fn run_import_slot(&self) {
        if let Some(feed) = &self.feed {
            if self.archiver.config().import.user.is_empty() {
                debug!("No user handle configured, skipping feed import");
            } else {
                info!("Running scheduled feed import");
                if let Err(e) = self.archiver.import_from_feed(feed.as_ref()).await {
                    error!(error = %e, "Scheduled feed import failed");
                }
            }
        }

        info!("Running scheduled download pass");
        if let Err(e) = self.archiver.run_download_pass().await {
            error!(error = %e, "Scheduled download pass failed");
        }
    }
}
