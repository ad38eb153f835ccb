//! WebVTT serialization for word-level caption tracks.

use std::fs;
use std::io;
use std::path::Path;

use crate::timecode::format_milliseconds;

use super::types::CaptionTrack;

/// Render a caption track as WebVTT text.
///
/// One cue block per word: a `start --> end` line, the word, and a blank
/// separator line. An empty track renders as a bare header, which is still
/// a valid document.
pub fn render_vtt(track: &CaptionTrack) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for cue in &track.cues {
        out.push_str(&format_milliseconds(cue.start_ms));
        out.push_str(" --> ");
        out.push_str(&format_milliseconds(cue.end_ms));
        out.push('\n');
        out.push_str(&cue.text);
        out.push_str("\n\n");
    }
    out
}

/// Write a caption track to disk as WebVTT.
pub fn write_vtt(path: &Path, track: &CaptionTrack) -> io::Result<()> {
    fs::write(path, render_vtt(track))
}
