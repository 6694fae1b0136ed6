//! Media fetch/probe collaborator
//!
//! This module provides a trait-based architecture for talking to the
//! external extraction tool that can both materialize a video locally and
//! probe whether it is still retrievable. The core abstraction is the
//! [`MediaFetcher`] trait; [`YtDlpFetcher`] drives the external `yt-dlp`
//! binary.
//!
//! Fetcher implementations should surface the tool's error text verbatim -
//! the retry layer classifies transient network failures by matching
//! message signatures.

mod traits;
mod ytdlp;

pub use traits::{MediaFetcher, MediaInfo};
pub use ytdlp::YtDlpFetcher;
