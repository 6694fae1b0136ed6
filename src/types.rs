//! Core types for likevault

use serde::{Deserialize, Serialize};

/// Opaque handle to an outbound removal notification (e.g., a sent chat message)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl MessageId {
    /// Create a new MessageId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<MessageId> for i64 {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Implement sqlx Type, Encode, and Decode for database operations
impl sqlx::Type<sqlx::Sqlite> for MessageId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for MessageId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for MessageId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Lifecycle status of an archived video
///
/// `new → success | failed` after a download attempt; `success ↔ deleted`
/// as availability checks observe the source. `deleted` describes source
/// unavailability, never local removal - rows are never deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    /// Imported but not yet downloaded
    New,
    /// Downloaded and last seen available at the source
    Success,
    /// Download attempt exhausted retries with a content-level error
    Failed,
    /// Previously downloaded, currently unavailable at the source
    Deleted,
}

impl VideoStatus {
    /// Status as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::New => "new",
            VideoStatus::Success => "success",
            VideoStatus::Failed => "failed",
            VideoStatus::Deleted => "deleted",
        }
    }

    /// Parse a stored status string
    pub fn from_str_or_new(status: &str) -> Self {
        match status {
            "success" => VideoStatus::Success,
            "failed" => VideoStatus::Failed,
            "deleted" => VideoStatus::Deleted,
            _ => VideoStatus::New,
        }
    }
}

impl std::fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of media materialized for a video
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Regular video payload
    Video,
    /// Multi-image post rendered into a video locally
    Slideshow,
}

impl MediaType {
    /// Media type as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Slideshow => "slideshow",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single download attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Media was materialized and the record committed as `success`
    Success,
    /// Terminal failure; the record was committed as `failed` (or reverted
    /// to `new` for an audio payload whose slideshow render failed)
    Failed,
    /// Transient network failure; the record was left untouched
    NetworkSkipped,
}

/// Counters from one download pass over the queue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Records attempted in this pass
    pub attempted: u64,
    /// Downloads committed as `success`
    pub succeeded: u64,
    /// Terminal failures
    pub failed: u64,
    /// Records skipped on transient network errors
    pub network_skipped: u64,
    /// Records still `new` after the pass
    pub remaining_new: u64,
}

/// Counters from one availability-check batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Eligible records (`success` or `deleted`) at batch start
    pub total: u64,
    /// Batch size computed for this invocation
    pub batch_size: u64,
    /// Records actually probed to completion
    pub checked: u64,
    /// Records found unavailable in this batch
    pub unavailable: u64,
    /// Records restored from `deleted` back to `success`
    pub restored: u64,
    /// Records skipped (transient probe error or held-back transition)
    pub skipped: u64,
}

/// Counters from an import run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Items seen in the source
    pub seen: u64,
    /// Rows newly inserted
    pub added: u64,
}

/// One liked/favorited item from the bulk-listing collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedItem {
    /// Opaque content identifier
    pub id: String,
    /// Unix timestamp of the like (or publish date)
    pub timestamp: i64,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [
            VideoStatus::New,
            VideoStatus::Success,
            VideoStatus::Failed,
            VideoStatus::Deleted,
        ] {
            assert_eq!(VideoStatus::from_str_or_new(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_string_falls_back_to_new() {
        assert_eq!(VideoStatus::from_str_or_new("bogus"), VideoStatus::New);
    }

    #[test]
    fn message_id_conversions() {
        let id = MessageId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(MessageId::from(42i64), id);
        assert_eq!(id.to_string(), "42");
    }
}
