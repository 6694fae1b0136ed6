//! Telegram notification gateway over the Bot API

use super::traits::NotificationGateway;
use crate::db::Video;
use crate::types::MessageId;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Telegram gateway sending removal alerts as video messages
///
/// A removal notification uploads the archived copy via `sendVideo` with
/// the author, title and date as caption - the point of the alert is that
/// the local archive still has what the source dropped. A restoration
/// retires the alert via `editMessageMedia`, replacing the video with a
/// tiny placeholder document: Telegram refuses to delete messages older
/// than 48 hours, so editing is the reliable way to retract one.
///
/// Unconfigured credentials, transport errors and rejected requests all
/// degrade to `None`/`false` with a log line.
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    downloads_dir: PathBuf,
    api_base: String,
    client: reqwest::Client,
}

/// Envelope of a Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl TelegramNotifier {
    /// Create a notifier from bot credentials
    pub fn new(bot_token: String, chat_id: String, downloads_dir: PathBuf) -> Self {
        Self::with_api_base(bot_token, chat_id, downloads_dir, DEFAULT_API_BASE.to_string())
    }

    /// Create a notifier against a custom API base URL (used in tests)
    pub fn with_api_base(
        bot_token: String,
        chat_id: String,
        downloads_dir: PathBuf,
        api_base: String,
    ) -> Self {
        Self {
            bot_token,
            chat_id,
            downloads_dir,
            api_base,
            client: reqwest::Client::new(),
        }
    }

    fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    fn caption(video: &Video) -> String {
        let mut caption = String::new();
        if let Some(author) = &video.author {
            caption.push_str(author);
            caption.push('\n');
        }
        if let Some(name) = &video.name {
            caption.push_str(name);
        }
        if let Some(date) = chrono::DateTime::from_timestamp(video.date, 0) {
            caption.push('\n');
            caption.push_str(&date.format("%d.%m.%Y").to_string());
        }
        caption
    }

    async fn send_video(&self, video: &Video) -> crate::Result<Option<MessageId>> {
        let media_path = self.downloads_dir.join(format!("{}.mp4", video.id));
        let bytes = tokio::fs::read(&media_path).await.map_err(|_| {
            crate::Error::NotFound(format!("archived file missing: {}", media_path.display()))
        })?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(format!("{}.mp4", video.id))
            .mime_str("video/mp4")?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", Self::caption(video))
            .text("supports_streaming", "true")
            .part("video", part);

        let response = self
            .client
            .post(self.method_url("sendVideo"))
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::Other(format!(
                "sendVideo was rejected: {body}"
            )));
        }

        let parsed: ApiResponse = response.json().await?;
        Ok(parsed.result.map(|m| MessageId::new(m.message_id)))
    }

    async fn edit_message(&self, handle: MessageId, video: &Video) -> crate::Result<()> {
        // Replace the video with a placeholder document carrying the id,
        // leaving a retractable stub where the alert used to be
        let media = serde_json::json!({
            "type": "document",
            "media": "attach://restored",
        });

        let part = reqwest::multipart::Part::bytes(video.id.clone().into_bytes())
            .file_name("restored");
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("message_id", handle.to_string())
            .text("media", media.to_string())
            .part("restored", part);

        let response = self
            .client
            .post(self.method_url("editMessageMedia"))
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::Other(format!(
                "editMessageMedia was rejected: {body}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationGateway for TelegramNotifier {
    async fn notify_removed(&self, video: &Video) -> Option<MessageId> {
        if !self.is_configured() {
            tracing::warn!("Telegram gateway not configured (token or chat ID missing)");
            return None;
        }

        match self.send_video(video).await {
            Ok(Some(handle)) => {
                tracing::info!(video_id = %video.id, %handle, "Removal notification sent");
                Some(handle)
            }
            Ok(None) => {
                tracing::warn!(video_id = %video.id, "sendVideo response carried no message id");
                None
            }
            Err(e) => {
                tracing::warn!(video_id = %video.id, error = %e, "Failed to send removal notification");
                None
            }
        }
    }

    async fn retire_notification(&self, handle: MessageId, video: &Video) -> bool {
        if !self.is_configured() {
            tracing::warn!("Telegram gateway not configured (token or chat ID missing)");
            return false;
        }

        match self.edit_message(handle, video).await {
            Ok(()) => {
                tracing::info!(video_id = %video.id, %handle, "Removal notification retired");
                true
            }
            Err(e) => {
                tracing::warn!(video_id = %video.id, %handle, error = %e, "Failed to retire notification");
                false
            }
        }
    }
}
