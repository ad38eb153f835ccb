//! Batch summary document.
//!
//! A purely descriptive, human-readable record of the batch written once at
//! the end of a successful run. The pipeline never reads it back, and a
//! write failure is logged rather than surfaced as a batch failure.

use std::fs;
use std::io;
use std::path::Path;

use chrono::Local;

use crate::models::BatchRequest;

const BANNER: &str = "================================================================================";

/// Per-clip facts reported in the summary.
#[derive(Debug, Clone)]
pub struct ClipReport {
    /// Clip title.
    pub title: String,
    /// Start timecode text.
    pub start: String,
    /// End timecode text.
    pub end: String,
    /// Short description.
    pub summary: String,
    /// Complete segment transcript.
    pub full_text: String,
}

/// Assemble the summary document text.
pub fn build_batch_summary(request: &BatchRequest, clips: &[ClipReport]) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(BANNER.to_string());
    lines.push("CLIP PROCESSING SUMMARY".to_string());
    lines.push(BANNER.to_string());
    lines.push(format!("Source: {}", request.source_label));
    lines.push(format!(
        "Processing Date: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(format!("Language: {}", request.language));
    lines.push(format!("Aspect Ratio: {}", request.aspect_ratio.as_str()));
    lines.push(format!("Number of Clips Generated: {}", clips.len()));
    lines.push(format!(
        "Subtitles Included: {}",
        if request.include_captions { "Yes" } else { "No" }
    ));
    lines.push(format!(
        "Watermark Included: {}",
        if request.include_watermark { "Yes" } else { "No" }
    ));
    if request.include_watermark {
        lines.push(format!("Watermark Text: {}", request.watermark_text));
    }
    lines.push(String::new());
    lines.push(BANNER.to_string());
    lines.push("CLIP DETAILS".to_string());
    lines.push(BANNER.to_string());

    for (i, clip) in clips.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("CLIP {}: {}", i + 1, clip.title));
        lines.push("-".repeat(clip.title.len() + 10));
        lines.push(format!("Start Time: {}", clip.start));
        lines.push(format!("End Time: {}", clip.end));
        lines.push(format!("Summary: {}", clip.summary));
        lines.push(String::new());
        lines.push("Full Text:".to_string());
        lines.push(clip.full_text.clone());
        lines.push(String::new());
        lines.push("-".repeat(80));
    }

    lines.join("\n")
}

/// Write the summary document.
///
/// Callers treat the result as best-effort: an `Err` is logged, never
/// propagated as a batch failure.
pub fn write_batch_summary(
    path: &Path,
    request: &BatchRequest,
    clips: &[ClipReport],
) -> io::Result<()> {
    fs::write(path, build_batch_summary(request, clips))
}
