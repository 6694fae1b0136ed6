//! Error types for likevault
//!
//! Crate-wide error taxonomy. The retry layer builds its transient/terminal
//! classification ([`crate::retry::ProbeError`]) on top of these by matching
//! the rendered error text, so fetcher implementations should surface the
//! underlying tool's message verbatim.

use thiserror::Error;

/// Result type alias for likevault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for likevault
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "downloads_dir")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Video not found in the repository
    #[error("video not found: {0}")]
    NotFound(String),

    /// Network error from the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed export file
    #[error("invalid export file: {0}")]
    InvalidExport(String),

    /// External tool execution failed (yt-dlp, gallery-dl, ffmpeg, etc.)
    ///
    /// Carries the tool's own output so the retry layer can classify
    /// transient network failures from the message text.
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),
}
