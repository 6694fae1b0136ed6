//! Configuration types for likevault

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Archive storage configuration (directories)
///
/// Groups settings related to where downloaded media and intermediate
/// slideshow assets are stored. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Directory for archived media files (default: "./downloads")
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,

    /// Temporary directory for slideshow rendering (default: "/tmp/likevault")
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            downloads_dir: default_downloads_dir(),
            tmp_dir: default_tmp_dir(),
        }
    }
}

/// Fetch and retry behavior configuration
///
/// Groups settings for the download/probe path. Used as a nested sub-config
/// within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum attempts per fetch/probe before classifying the failure
    /// (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Re-attempt previously `failed` downloads on the chance the content
    /// became retrievable again (default: false)
    ///
    /// Hope-mode passes can take a long time; setting `max_retries` to 1
    /// while it is enabled keeps them bearable.
    #[serde(default)]
    pub hope_mode: bool,

    /// Ask the fetcher to impersonate a real browser to get past anti-bot
    /// checks on the source platform (default: false)
    #[serde(default)]
    pub anti_bot: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            hope_mode: false,
            anti_bot: false,
        }
    }
}

/// Availability-check configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Number of days over which one full sweep of the archive is amortized
    /// (default: 7)
    ///
    /// With hourly invocation, each batch checks
    /// `ceil(total / check_interval_days / 24)` records, oldest-checked
    /// first, so worst-case staleness is bounded by this interval.
    #[serde(default = "default_check_interval_days")]
    pub check_interval_days: u32,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            check_interval_days: default_check_interval_days(),
        }
    }
}

/// Import configuration (export file and liked-feed seeding)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Import items from the export's like list (default: true)
    #[serde(default = "default_true")]
    pub import_liked: bool,

    /// Import items from the export's favorites list (default: true)
    #[serde(default = "default_true")]
    pub import_favorites: bool,

    /// Path to the source platform's JSON data export
    /// (default: "./user_data_export.json")
    #[serde(default = "default_export_file")]
    pub export_file: PathBuf,

    /// Account handle used by the bulk liked-listing collaborator
    /// (default: empty - feed import disabled)
    #[serde(default)]
    pub user: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            import_liked: true,
            import_favorites: true,
            export_file: default_export_file(),
            user: String::new(),
        }
    }
}

/// Telegram notification gateway configuration
///
/// Used as a nested sub-config within [`Config`]. When either field is
/// empty, the gateway reports itself unconfigured and every delivery
/// degrades to "retry next pass".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token (default: empty)
    #[serde(default)]
    pub bot_token: String,

    /// Target chat ID (default: empty)
    #[serde(default)]
    pub chat_id: String,
}

/// Data storage configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path to the SQLite database file (default: "./likevault.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Main configuration for the [`Archiver`](crate::Archiver)
///
/// Immutable once passed into the constructor; there is no global mutable
/// state. Fields are organized into logical sub-configs:
/// - [`archive`](ArchiveConfig) - storage directories
/// - [`fetch`](FetchConfig) - retry count, hope mode, anti-bot toggle
/// - [`check`](CheckConfig) - availability sweep interval
/// - [`import`](ImportConfig) - export file and feed seeding
/// - [`telegram`](TelegramConfig) - notification gateway credentials
/// - [`persistence`](PersistenceConfig) - database location
///
/// Sub-config fields are flattened for serialization, so the on-disk format
/// stays a single flat table. Loading the file itself is the consumer's
/// concern; this crate only defines the deserializable shape.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage directories
    #[serde(flatten)]
    pub archive: ArchiveConfig,

    /// Fetch and retry behavior
    #[serde(flatten)]
    pub fetch: FetchConfig,

    /// Availability-check sweep settings
    #[serde(flatten)]
    pub check: CheckConfig,

    /// Import settings
    #[serde(flatten)]
    pub import: ImportConfig,

    /// Telegram gateway settings
    #[serde(flatten)]
    pub telegram: TelegramConfig,

    /// Data storage settings
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

// Convenience accessors - keep call sites short without reaching through
// the sub-config structs.
impl Config {
    /// Directory for archived media files
    pub fn downloads_dir(&self) -> &PathBuf {
        &self.archive.downloads_dir
    }

    /// Temporary directory for slideshow rendering
    pub fn tmp_dir(&self) -> &PathBuf {
        &self.archive.tmp_dir
    }
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_tmp_dir() -> PathBuf {
    PathBuf::from("/tmp/likevault")
}

fn default_export_file() -> PathBuf {
    PathBuf::from("./user_data_export.json")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./likevault.db")
}

fn default_max_retries() -> u32 {
    3
}

fn default_check_interval_days() -> u32 {
    7
}

fn default_true() -> bool {
    true
}
