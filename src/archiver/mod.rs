//! Core archiver implementation (decomposed into focused submodules)
//!
//! [`Archiver`] owns the database, the immutable configuration, and the
//! external collaborators, and drives the video lifecycle:
//!
//! - [`download`] - drives `new` (and, under hope mode, `failed`) records
//!   through download attempts
//! - [`check`] - periodic availability sweeps with disappearance and
//!   restoration handling
//! - [`import`] - seeding the archive from a data export or the liked feed
//!
//! Batches are processed strictly sequentially; there is one writer and no
//! cross-record transaction anywhere.

use crate::config::Config;
use crate::db::Database;
use crate::fetch::MediaFetcher;
use crate::notify::NotificationGateway;
use crate::slideshow::SlideshowRenderer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

mod check;
mod download;
mod import;

/// Central handle driving the video archive
///
/// # Example
///
/// ```no_run
/// use likevault::{Archiver, Config};
/// use likevault::fetch::YtDlpFetcher;
/// use likevault::notify::TelegramNotifier;
/// use likevault::slideshow::NoOpSlideshowRenderer;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let fetcher = YtDlpFetcher::from_path(config.downloads_dir().clone(), false)
///     .expect("yt-dlp not found");
/// let gateway = TelegramNotifier::new(
///     config.telegram.bot_token.clone(),
///     config.telegram.chat_id.clone(),
///     config.downloads_dir().clone(),
/// );
///
/// let archiver = Archiver::new(
///     config,
///     Arc::new(fetcher),
///     Arc::new(NoOpSlideshowRenderer),
///     Arc::new(gateway),
/// )
/// .await?;
///
/// let report = archiver.run_download_pass().await?;
/// println!("downloaded {}/{}", report.succeeded, report.attempted);
/// # Ok(())
/// # }
/// ```
pub struct Archiver {
    pub(crate) config: Config,
    pub(crate) db: Database,
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    pub(crate) renderer: Arc<dyn SlideshowRenderer>,
    pub(crate) gateway: Arc<dyn NotificationGateway>,
    shutting_down: AtomicBool,
}

impl Archiver {
    /// Create an archiver, opening (and migrating) the database
    pub async fn new(
        config: Config,
        fetcher: Arc<dyn MediaFetcher>,
        renderer: Arc<dyn SlideshowRenderer>,
        gateway: Arc<dyn NotificationGateway>,
    ) -> crate::Result<Self> {
        let db = Database::new(&config.persistence.database_path).await?;

        Ok(Self {
            config,
            db,
            fetcher,
            renderer,
            gateway,
            shutting_down: AtomicBool::new(false),
        })
    }

    /// Access the underlying video repository
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Access the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Signal background tasks to stop after their current record
    pub fn shutdown(&self) {
        tracing::info!("Shutdown requested");
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown was requested
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
