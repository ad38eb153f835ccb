//! Word-level caption synthesis and ASS styling.

mod ass;
mod synthesizer;
mod types;
mod vtt;

pub use ass::{AssDocument, AssSection};
pub use synthesizer::{
    build_word_track, CaptionError, StaticWordTimings, SubtitleSynthesizer, WordTimingSource,
};
pub use types::{AssColor, CaptionCue, CaptionStyle, CaptionTrack};
pub use vtt::{render_vtt, write_vtt};
