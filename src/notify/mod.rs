//! Notification gateway
//!
//! Outbound alerts for disappeared content. The core never treats gateway
//! failure as fatal: an undeliverable notification simply holds the record
//! in its pre-transition status so the next scheduled pass retries.
//!
//! The core abstraction is the [`NotificationGateway`] trait;
//! [`TelegramNotifier`] delivers over the Telegram Bot API.

mod telegram;
mod traits;

pub use telegram::TelegramNotifier;
pub use traits::NotificationGateway;
