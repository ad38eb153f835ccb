//! clipforge - Core pipeline for short-form clip production.
//!
//! This crate contains the clip materialization logic with no transport
//! dependencies: timecode arithmetic, per-clip extraction with cropping and
//! fades, word-level caption synthesis with ASS restyling, and the
//! compositing chain that burns captions and a watermark into final renders.
//!
//! Acquisition, transcription, and segment selection are external
//! collaborators: the caller provides a source video file, an ordered list of
//! [`models::ClipDescriptor`]s, and a [`captions::WordTimingSource`].

pub mod artifacts;
pub mod captions;
pub mod compose;
pub mod config;
pub mod extract;
pub mod logging;
pub mod media;
pub mod models;
pub mod pipeline;
pub mod status;
pub mod timecode;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
