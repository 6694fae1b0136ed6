//! Video repository CRUD and per-probe-outcome commits.
//!
//! Plain setters mutate one field at a time; the `record_*` / `mark_*`
//! methods commit a whole probe outcome (status, notification handle,
//! deleted reason, last_checked) as a single UPDATE so no reader can
//! observe an inconsistent intermediate row, e.g. `deleted` with a stale
//! handle. All mutators are no-ops returning `false` when the id is absent.

use crate::error::DatabaseError;
use crate::types::{MediaType, MessageId, VideoStatus};
use crate::{Error, Result};

use super::{Database, NewVideo, Video};

const VIDEO_COLUMNS: &str = "id, name, author, date, status, media_type, \
     last_checked, message_id, deleted_reason, created_at, updated_at";

impl Database {
    /// Insert a video if it does not exist yet, returning the stored row
    ///
    /// Idempotent: importing an already-present id changes nothing, in
    /// particular not `date`.
    pub async fn upsert_video(&self, video: &NewVideo) -> Result<Video> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO videos (id, author, date, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&video.id)
        .bind(&video.author)
        .bind(video.date)
        .bind(VideoStatus::New.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to upsert video: {}",
                e
            )))
        })?;

        self.get_video(&video.id).await?.ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(format!(
                "video {} vanished after upsert",
                video.id
            )))
        })
    }

    /// Get a video by ID
    pub async fn get_video(&self, id: &str) -> Result<Option<Video>> {
        let row = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get video: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// List videos, optionally filtered by status, ordered by date
    pub async fn list_videos(&self, status: Option<VideoStatus>) -> Result<Vec<Video>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, Video>(&format!(
                    "SELECT {VIDEO_COLUMNS} FROM videos WHERE status = ? ORDER BY date ASC"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Video>(&format!(
                    "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY date ASC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list videos: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Count records eligible for availability checks (`success` or `deleted`)
    pub async fn count_checkable(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM videos WHERE status IN ('success', 'deleted')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to count checkable videos: {}",
                e
            )))
        })?;

        Ok(count as u64)
    }

    /// Select the next availability-check batch
    ///
    /// Restricted to statuses `success` and `deleted`, least-recently-checked
    /// first with never-checked rows (NULL `last_checked`) ahead of all
    /// others, so every record is eventually covered and worst-case
    /// staleness stays bounded.
    pub async fn select_check_batch(&self, limit: u64) -> Result<Vec<Video>> {
        let rows = sqlx::query_as::<_, Video>(&format!(
            r#"
            SELECT {VIDEO_COLUMNS} FROM videos
            WHERE status IN ('success', 'deleted')
            ORDER BY last_checked IS NOT NULL, last_checked ASC
            LIMIT ?
            "#
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to select check batch: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Update a video's status, optionally setting its name
    ///
    /// Returns false if the video does not exist.
    pub async fn set_status(
        &self,
        id: &str,
        status: VideoStatus,
        name: Option<&str>,
    ) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = match name {
            Some(name) => {
                sqlx::query("UPDATE videos SET status = ?, name = ?, updated_at = ? WHERE id = ?")
                    .bind(status.as_str())
                    .bind(name)
                    .bind(now)
                    .bind(id)
                    .execute(&self.pool)
                    .await
            }
            None => {
                sqlx::query("UPDATE videos SET status = ?, updated_at = ? WHERE id = ?")
                    .bind(status.as_str())
                    .bind(now)
                    .bind(id)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to set status: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Advance a video's `last_checked` to now
    ///
    /// Returns false if the video does not exist.
    pub async fn touch_checked(&self, id: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result =
            sqlx::query("UPDATE videos SET last_checked = ?, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to touch last_checked: {}",
                        e
                    )))
                })?;

        Ok(result.rows_affected() > 0)
    }

    /// Set or clear a video's outstanding notification handle
    pub async fn set_notification_handle(
        &self,
        id: &str,
        handle: Option<MessageId>,
    ) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query("UPDATE videos SET message_id = ?, updated_at = ? WHERE id = ?")
            .bind(handle)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to set notification handle: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Record why a probe concluded the content was gone
    pub async fn set_deleted_reason(&self, id: &str, reason: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result =
            sqlx::query("UPDATE videos SET deleted_reason = ?, updated_at = ? WHERE id = ?")
                .bind(reason)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to set deleted reason: {}",
                        e
                    )))
                })?;

        Ok(result.rows_affected() > 0)
    }

    /// Commit a successful download in one atomic update
    ///
    /// Sets status `success`, name, and media type, advances `last_checked`.
    /// The author is only filled when the row has none yet - an author set
    /// at import time or by an earlier download is never overwritten.
    pub async fn record_download_success(
        &self,
        id: &str,
        name: &str,
        author: Option<&str>,
        media_type: MediaType,
    ) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE videos
            SET status = 'success',
                name = ?,
                author = COALESCE(author, ?),
                media_type = ?,
                last_checked = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(author)
        .bind(media_type.as_str())
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to record download success: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Commit a terminal download failure in one atomic update
    ///
    /// Sets status `failed`, clears the descriptive fields, advances
    /// `last_checked` (the probe did complete - it just found nothing
    /// retrievable).
    pub async fn record_download_failure(&self, id: &str) -> Result<bool> {
        self.reset_after_download(id, VideoStatus::Failed).await
    }

    /// Put a video back to `new` in one atomic update
    ///
    /// Used for an audio-only payload whose slideshow render failed: a
    /// later download pass should retry acquisition from scratch.
    pub async fn record_download_deferred(&self, id: &str) -> Result<bool> {
        self.reset_after_download(id, VideoStatus::New).await
    }

    async fn reset_after_download(&self, id: &str, status: VideoStatus) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE videos
            SET status = ?,
                name = NULL,
                media_type = NULL,
                last_checked = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to record download outcome: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Commit an observed disappearance whose notification was not delivered
    ///
    /// One atomic update: stores the diagnostic reason and advances
    /// `last_checked` while the status stays put, so the next pass retries
    /// the notification.
    pub async fn record_pending_removal(&self, id: &str, reason: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE videos
            SET deleted_reason = ?,
                last_checked = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(reason)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to record pending removal: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Commit a confirmed disappearance in one atomic update
    ///
    /// Sets status `deleted`, stores the delivered notification handle and
    /// the diagnostic reason, advances `last_checked`.
    pub async fn mark_deleted(&self, id: &str, handle: MessageId, reason: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE videos
            SET status = 'deleted',
                message_id = ?,
                deleted_reason = ?,
                last_checked = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(handle)
        .bind(reason)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to mark video deleted: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Commit a restoration in one atomic update
    ///
    /// Sets status `success`, clears the notification handle, advances
    /// `last_checked`. The handle is cleared exactly when the status leaves
    /// `deleted`, never separately.
    pub async fn mark_restored(&self, id: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE videos
            SET status = 'success',
                message_id = NULL,
                last_checked = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to mark video restored: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }
}
