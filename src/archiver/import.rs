//! Import: seeding the archive from a data export or the liked feed.

use crate::db::NewVideo;
use crate::feed::LikedFeed;
use crate::types::ImportReport;
use crate::{Error, Result};

use chrono::NaiveDateTime;
use futures::StreamExt;
use std::collections::HashSet;
use std::path::Path;

/// How many consecutive already-known items end a feed import
///
/// The feed lists newest-first, so a window of known ids means everything
/// older is known too.
const FEED_KNOWN_WINDOW: usize = 20;

impl super::Archiver {
    /// Import a single video if it is not already known
    ///
    /// Returns true when a new row was inserted.
    pub async fn import_video(&self, video: &NewVideo) -> Result<bool> {
        if self.db.get_video(&video.id).await?.is_some() {
            return Ok(false);
        }
        self.db.upsert_video(video).await?;
        Ok(true)
    }

    /// Seed the archive from the source platform's JSON data export
    ///
    /// Reads the like list and/or favorites list per the import
    /// configuration, deduplicates across the two, and inserts the items
    /// oldest-first. Existing rows are never modified.
    pub async fn import_from_export(&self) -> Result<ImportReport> {
        let path = &self.config.import.export_file;
        tracing::info!(path = %path.display(), "Importing from data export");

        let raw = tokio::fs::read_to_string(path).await?;
        let export: serde_json::Value = serde_json::from_str(&raw)?;

        let activity = export.get("Your Activity").ok_or_else(|| {
            Error::InvalidExport("missing \"Your Activity\" section".to_string())
        })?;

        let mut items: Vec<NewVideo> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut report = ImportReport::default();

        if self.config.import.import_favorites {
            collect_export_items(
                activity,
                "Favorite Videos",
                "FavoriteVideoList",
                &mut items,
                &mut seen_ids,
                &mut report,
            );
        }
        if self.config.import.import_liked {
            collect_export_items(
                activity,
                "Like List",
                "ItemFavoriteList",
                &mut items,
                &mut seen_ids,
                &mut report,
            );
        }

        // Oldest first so created_at ordering roughly follows like order
        items.sort_by_key(|v| v.date);

        for item in &items {
            match self.import_video(item).await {
                Ok(true) => report.added += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(video_id = %item.id, error = %e, "Failed to import video");
                }
            }
        }

        tracing::info!(
            seen = report.seen,
            added = report.added,
            "Export import finished"
        );
        Ok(report)
    }

    /// Incrementally seed the archive from the bulk liked feed
    ///
    /// Consumes the newest-first stream until a window of consecutive
    /// already-known items shows the remainder is known. Refuses to run
    /// against an empty archive: without any known id the early-exit
    /// heuristic never fires and the import would walk the entire history,
    /// which is what the export path is for.
    pub async fn import_from_feed(&self, feed: &dyn LikedFeed) -> Result<ImportReport> {
        let user = self.config.import.user.as_str();
        if user.is_empty() {
            return Err(Error::Config {
                message: "feed import requires a user handle".to_string(),
                key: Some("user".to_string()),
            });
        }

        let known: HashSet<String> = self
            .db
            .list_videos(None)
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();
        if known.is_empty() {
            return Err(Error::Other(
                "refusing to import from the feed into an empty archive; \
                 seed it from a data export first"
                    .to_string(),
            ));
        }

        tracing::info!(user, "Importing from liked feed");
        let mut stream = feed.list_liked(user).await?;

        let mut report = ImportReport::default();
        let mut known_streak = 0usize;

        while let Some(item) = stream.next().await {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    tracing::error!(error = %e, "Feed item failed, continuing");
                    continue;
                }
            };
            report.seen += 1;

            // Compare against the archive as it stood at import start, so
            // rows added by this very run never count toward the streak
            if known.contains(&item.id) {
                known_streak += 1;
                if known_streak >= FEED_KNOWN_WINDOW {
                    tracing::info!("No new videos");
                    break;
                }
                continue;
            }
            known_streak = 0;

            let video = NewVideo {
                id: item.id,
                date: item.timestamp,
                author: None,
            };
            match self.import_video(&video).await {
                Ok(true) => report.added += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(video_id = %video.id, error = %e, "Failed to import video");
                }
            }
        }

        tracing::info!(
            seen = report.seen,
            added = report.added,
            "Feed import finished"
        );
        Ok(report)
    }
}

/// Collect one export list's items into the dedup'd accumulator
fn collect_export_items(
    activity: &serde_json::Value,
    section: &str,
    list_key: &str,
    items: &mut Vec<NewVideo>,
    seen_ids: &mut HashSet<String>,
    report: &mut ImportReport,
) {
    let Some(list) = activity
        .get(section)
        .and_then(|s| s.get(list_key))
        .and_then(|l| l.as_array())
    else {
        tracing::warn!(section, "Export has no such list, skipping");
        return;
    };

    for entry in list {
        report.seen += 1;
        match parse_export_entry(entry) {
            Ok(video) => {
                if seen_ids.insert(video.id.clone()) {
                    items.push(video);
                }
            }
            Err(e) => {
                tracing::warn!(section, error = %e, "Skipping malformed export entry");
            }
        }
    }
}

/// Parse one export list entry into an insertable video
///
/// Entries carry a share link and a local-naive timestamp; the id is the
/// numeric path segment before the trailing slash of the link.
fn parse_export_entry(entry: &serde_json::Value) -> Result<NewVideo> {
    let link = entry
        .get("link")
        .or_else(|| entry.get("Link"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidExport("entry has no link".to_string()))?;

    let id = video_id_from_link(link)
        .ok_or_else(|| Error::InvalidExport(format!("cannot extract id from link: {link}")))?;

    let date = entry
        .get("date")
        .or_else(|| entry.get("Date"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidExport("entry has no date".to_string()))?;

    let date = NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| Error::InvalidExport(format!("bad date {date:?}: {e}")))?
        .and_utc()
        .timestamp();

    Ok(NewVideo {
        id: id.to_string(),
        date,
        author: None,
    })
}

/// Extract the content id from a share link
///
/// Links end in `/<id>/`, so the id is the second-to-last slash-separated
/// segment. Links without a trailing slash still work since the split then
/// ends at the id itself.
fn video_id_from_link(link: &str) -> Option<&str> {
    let mut segments = link.split('/').rev().filter(|s| !s.is_empty());
    segments.next().filter(|s| s.chars().all(|c| c.is_ascii_digit()))
}
