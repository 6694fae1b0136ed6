//! Database layer for likevault
//!
//! Handles SQLite persistence for the video archive. One table, one row per
//! unique content identifier; rows are never deleted - `deleted` is a
//! status describing source availability, not local removal.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`videos`] - Video repository CRUD and per-probe-outcome commits

use crate::types::{MediaType, MessageId, VideoStatus};
use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod videos;

/// New video to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewVideo {
    /// Opaque stable content identifier
    pub id: String,
    /// Source publish/like timestamp (Unix seconds), immutable once set
    pub date: i64,
    /// Author handle, if already known at import time
    pub author: Option<String>,
}

/// Video record from database
#[derive(Debug, Clone, FromRow)]
pub struct Video {
    /// Opaque stable content identifier (primary key)
    pub id: String,
    /// Descriptive title, populated on successful download
    pub name: Option<String>,
    /// Author handle, filled once and never overwritten
    pub author: Option<String>,
    /// Source publish/like timestamp (Unix seconds)
    pub date: i64,
    /// Lifecycle status (see [`VideoStatus`] for the stored strings)
    pub status: String,
    /// Media kind (`video` or `slideshow`), set on successful download
    pub media_type: Option<String>,
    /// Unix timestamp of the most recent completed probe, download or check
    pub last_checked: Option<i64>,
    /// Outstanding removal-notification handle; non-null only while deleted
    pub message_id: Option<MessageId>,
    /// Diagnostic text from the probe that concluded the content was gone
    pub deleted_reason: Option<String>,
    /// Unix timestamp when the row was created
    pub created_at: i64,
    /// Unix timestamp of the last mutation
    pub updated_at: i64,
}

impl Video {
    /// Typed view of the stored status string
    pub fn status(&self) -> VideoStatus {
        VideoStatus::from_str_or_new(&self.status)
    }

    /// Typed view of the stored media type, if any
    pub fn media_type(&self) -> Option<MediaType> {
        match self.media_type.as_deref() {
            Some("video") => Some(MediaType::Video),
            Some("slideshow") => Some(MediaType::Slideshow),
            _ => None,
        }
    }
}

/// Database handle for likevault
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
