//! Slideshow rendering collaborator
//!
//! Multi-image posts resolve to an audio-only payload at the extractor;
//! turning them into an archivable video takes a separate pipeline: fetch
//! the images and audio, render them into a video, and place the result
//! next to the regular downloads.
//!
//! The core abstraction is the [`SlideshowRenderer`] trait. Two
//! implementations are provided:
//!
//! - [`CliSlideshowRenderer`]: drives external `gallery-dl`, `ffprobe` and
//!   `ffmpeg` binaries for full functionality
//! - [`NoOpSlideshowRenderer`]: stub for deployments without the external
//!   tools; every render reports failure, so slideshow posts simply stay
//!   `new`

mod cli;
mod noop;
mod traits;

pub use cli::CliSlideshowRenderer;
pub use noop::NoOpSlideshowRenderer;
pub use traits::SlideshowRenderer;
