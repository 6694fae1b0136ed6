//! # likevault
//!
//! Backend library for archiving liked short-form videos and tracking their
//! availability over time.
//!
//! ## Design Philosophy
//!
//! likevault is designed to be:
//! - **Archive-first** - Media is downloaded once and kept; database rows
//!   are never deleted
//! - **Cautious about takedowns** - A video is only marked gone after the
//!   failure is classified as content-level, never on a network blip
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Pluggable at the seams** - Fetching, slideshow rendering, and
//!   notifications are traits with swappable implementations
//!
//! ## Quick Start
//!
//! ```no_run
//! use likevault::{Archiver, Config};
//! use likevault::fetch::YtDlpFetcher;
//! use likevault::notify::TelegramNotifier;
//! use likevault::slideshow::NoOpSlideshowRenderer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     let fetcher = YtDlpFetcher::from_path(
//!         config.downloads_dir().clone(),
//!         config.fetch.anti_bot,
//!     )
//!     .ok_or("yt-dlp not found in PATH")?;
//!     let gateway = TelegramNotifier::new(
//!         config.telegram.bot_token.clone(),
//!         config.telegram.chat_id.clone(),
//!         config.downloads_dir().clone(),
//!     );
//!
//!     let archiver = Archiver::new(
//!         config,
//!         Arc::new(fetcher),
//!         Arc::new(NoOpSlideshowRenderer),
//!         Arc::new(gateway),
//!     )
//!     .await?;
//!
//!     // Seed the archive from a data export, then download everything
//!     archiver.import_from_export().await?;
//!     let report = archiver.run_download_pass().await?;
//!     println!("downloaded {}/{}", report.succeeded, report.attempted);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Core archiver implementation (decomposed into focused submodules)
pub mod archiver;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Bulk liked-listing collaborator
pub mod feed;
/// Media fetch/probe collaborator
pub mod fetch;
/// Notification gateway
pub mod notify;
/// Retry and transient/terminal failure classification
pub mod retry;
/// Background schedule task
pub mod schedule;
/// Slideshow rendering collaborator
pub mod slideshow;
/// Core types and reports
pub mod types;

// Re-export commonly used types
pub use archiver::Archiver;
pub use config::Config;
pub use db::{Database, NewVideo, Video};
pub use error::{DatabaseError, Error, Result};
pub use feed::LikedFeed;
pub use fetch::{MediaFetcher, MediaInfo, YtDlpFetcher};
pub use notify::{NotificationGateway, TelegramNotifier};
pub use schedule::ScheduleTask;
pub use slideshow::{CliSlideshowRenderer, NoOpSlideshowRenderer, SlideshowRenderer};
pub use types::{
    CheckReport, DownloadOutcome, DownloadReport, ImportReport, LikedItem, MediaType, MessageId,
    VideoStatus,
};

/// Helper function to run the schedule task with graceful signal handling.
///
/// Spawns the task, waits for a termination signal, and then signals the
/// archiver to shut down; the task exits after its current record.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use likevault::{Archiver, Config, run_with_shutdown};
/// use likevault::fetch::YtDlpFetcher;
/// use likevault::notify::TelegramNotifier;
/// use likevault::slideshow::NoOpSlideshowRenderer;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::default();
///     let fetcher = YtDlpFetcher::from_path(config.downloads_dir().clone(), false)
///         .ok_or("yt-dlp not found in PATH")?;
///     let gateway = TelegramNotifier::new(
///         config.telegram.bot_token.clone(),
///         config.telegram.chat_id.clone(),
///         config.downloads_dir().clone(),
///     );
///     let archiver = Arc::new(
///         Archiver::new(
///             config,
///             Arc::new(fetcher),
///             Arc::new(NoOpSlideshowRenderer),
///             Arc::new(gateway),
///         )
///         .await?,
///     );
///
///     // Run on the hourly schedule until SIGTERM/SIGINT
///     run_with_shutdown(archiver).await;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(archiver: std::sync::Arc<Archiver>) {
    let task = ScheduleTask::new(archiver.clone());
    let handle = tokio::spawn(task.run());

    wait_for_signal().await;
    archiver.shutdown();

    if let Err(e) = handle.await {
        tracing::error!(error = %e, "Schedule task panicked during shutdown");
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
