//! Domain models shared across the pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::timecode;

/// One externally supplied instruction to extract a segment from the source
/// video. Produced by the selection collaborator; immutable once handed to
/// the pipeline.
///
/// Timecodes are textual `HH:MM:SS.mmm`. The descriptor is not trusted:
/// range and geometry validation happen in the extract step, and a
/// descriptor that fails validation is skipped, never fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDescriptor {
    /// Human-readable clip title (also drives the output filename).
    #[serde(rename = "clip_title")]
    pub title: String,
    /// Segment start on the source timeline.
    #[serde(rename = "start_time")]
    pub start: String,
    /// Segment end on the source timeline.
    #[serde(rename = "end_time")]
    pub end: String,
    /// Short description of the segment.
    #[serde(default)]
    pub summary: String,
    /// Complete transcript text of the segment.
    #[serde(default)]
    pub full_text: String,
}

impl ClipDescriptor {
    /// Segment start in seconds (0.0 if the timecode is malformed).
    pub fn start_seconds(&self) -> f64 {
        timecode::parse_seconds(&self.start)
    }

    /// Segment end in seconds (0.0 if the timecode is malformed).
    pub fn end_seconds(&self) -> f64 {
        timecode::parse_seconds(&self.end)
    }

    /// Segment start in integer milliseconds.
    pub fn start_milliseconds(&self) -> i64 {
        timecode::parse_milliseconds(&self.start)
    }

    /// Segment end in integer milliseconds.
    pub fn end_milliseconds(&self) -> i64 {
        timecode::parse_milliseconds(&self.end)
    }
}

/// A single word with its timing window, absolute on the source timeline.
///
/// Supplied by the transcription collaborator for a requested clip window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTiming {
    /// The spoken word.
    pub text: String,
    /// Start of the word on the source timeline, in milliseconds.
    pub start_ms: i64,
    /// End of the word on the source timeline, in milliseconds.
    pub end_ms: i64,
}

/// Target aspect ratio for the center-anchored crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Crop horizontally to a 9:16 portrait frame.
    #[serde(rename = "9:16")]
    Portrait,
    /// Crop vertically to a 16:9 landscape frame.
    #[serde(rename = "16:9")]
    Landscape,
    /// Leave the source frame untouched.
    #[default]
    #[serde(other)]
    Original,
}

impl AspectRatio {
    /// Parse the wire form (`"9:16"`, `"16:9"`); anything else means no crop.
    pub fn from_str_lossy(value: &str) -> Self {
        match value.trim() {
            "9:16" => Self::Portrait,
            "16:9" => Self::Landscape,
            _ => Self::Original,
        }
    }

    /// Wire/display form of the ratio.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "9:16",
            Self::Landscape => "16:9",
            Self::Original => "original",
        }
    }
}

/// Per-batch request parameters supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Identity of the source (URL or upload name), reported in the summary.
    pub source_label: String,
    /// Transcription language, reported in the summary.
    pub language: String,
    /// Whether to synthesize and burn word-level captions.
    pub include_captions: bool,
    /// Whether to draw the watermark onto final clips.
    pub include_watermark: bool,
    /// Watermark text (used only when `include_watermark` is set).
    pub watermark_text: String,
    /// Target aspect ratio for cropping.
    pub aspect_ratio: AspectRatio,
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self {
            source_label: String::new(),
            language: "English".to_string(),
            include_captions: true,
            include_watermark: true,
            watermark_text: "@clipforge".to_string(),
            aspect_ratio: AspectRatio::Portrait,
        }
    }
}

/// A trimmed, cropped, fade-bounded clip written by the extract step.
///
/// Owned by the batch run that created it; the compose step consumes it and
/// the final composited file supersedes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedClip {
    /// Zero-based descriptor index.
    pub index: usize,
    /// Original descriptor title.
    pub title: String,
    /// Deterministic `{index+1}_{sanitized_title}` stem shared by every
    /// per-clip artifact.
    pub basename: String,
    /// Path of the rendered per-clip file.
    pub path: PathBuf,
    /// Effective pixel width after cropping.
    pub width: u32,
    /// Effective pixel height after cropping.
    pub height: u32,
    /// Effective duration in seconds after trimming.
    pub duration_secs: f64,
    /// Clip start on the source timeline, in milliseconds.
    pub start_ms: i64,
    /// Clip end on the source timeline, in milliseconds.
    pub end_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_deserializes_from_selection_payload() {
        let json = r#"{
            "clip_title": "The Big Reveal",
            "start_time": "00:01:10.500",
            "end_time": "00:01:55.000",
            "summary": "A reveal.",
            "full_text": "..."
        }"#;
        let d: ClipDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.title, "The Big Reveal");
        assert!((d.start_seconds() - 70.5).abs() < 1e-9);
        assert_eq!(d.end_milliseconds(), 115_000);
    }

    #[test]
    fn aspect_ratio_parses_known_values() {
        assert_eq!(AspectRatio::from_str_lossy("9:16"), AspectRatio::Portrait);
        assert_eq!(AspectRatio::from_str_lossy("16:9"), AspectRatio::Landscape);
        assert_eq!(AspectRatio::from_str_lossy("4:3"), AspectRatio::Original);
        assert_eq!(AspectRatio::from_str_lossy(""), AspectRatio::Original);
    }
}
