//! Source video probing via ffprobe.
//!
//! Yields the pixel dimensions and duration the extract step needs for
//! geometry validation and end-time clamping.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::runner::{self, ToolError};

/// Timeout for a probe invocation; probing is metadata-only and fast.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from probing a source video.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The source file does not exist. Fatal for the batch: nothing can be
    /// extracted without it.
    #[error("Source video not found: {0}")]
    SourceNotFound(String),

    /// ffprobe invocation failed.
    #[error("ffprobe failed: {0}")]
    Tool(#[from] ToolError),

    /// ffprobe output could not be interpreted.
    #[error("Failed to parse ffprobe output: {0}")]
    Parse(String),
}

/// Probed facts about the source video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceInfo {
    /// Pixel width of the first video stream.
    pub width: u32,
    /// Pixel height of the first video stream.
    pub height: u32,
    /// Container duration in seconds.
    pub duration_secs: f64,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe a source video with ffprobe.
pub fn probe_source(path: &Path) -> Result<SourceInfo, ProbeError> {
    if !path.exists() {
        return Err(ProbeError::SourceNotFound(path.display().to_string()));
    }

    let ffprobe = runner::locate_tool("ffprobe")?;

    let mut cmd = Command::new(ffprobe);
    cmd.arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("v:0")
        .arg("-show_entries")
        .arg("stream=width,height")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("json")
        .arg(path);

    let output = runner::run_with_timeout(&mut cmd, "ffprobe", PROBE_TIMEOUT)?;
    parse_probe_output(&output.stdout_text())
}

/// Parse the JSON document ffprobe emits.
fn parse_probe_output(json: &str) -> Result<SourceInfo, ProbeError> {
    let parsed: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| ProbeError::Parse("no video stream reported".to_string()))?;

    let width = stream
        .width
        .ok_or_else(|| ProbeError::Parse("missing stream width".to_string()))?;
    let height = stream
        .height
        .ok_or_else(|| ProbeError::Parse("missing stream height".to_string()))?;

    let duration_secs = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| ProbeError::Parse("missing or invalid duration".to_string()))?;

    tracing::debug!(width, height, duration_secs, "probed source video");

    Ok(SourceInfo {
        width,
        height,
        duration_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typical_ffprobe_json() {
        let json = r#"{
            "streams": [{"width": 1920, "height": 1080}],
            "format": {"duration": "1234.567000"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert!((info.duration_secs - 1234.567).abs() < 1e-6);
    }

    #[test]
    fn rejects_json_without_video_stream() {
        let json = r#"{"streams": [], "format": {"duration": "10.0"}}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(ProbeError::Parse(_))
        ));
    }

    #[test]
    fn rejects_missing_duration() {
        let json = r#"{"streams": [{"width": 640, "height": 480}], "format": {}}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(ProbeError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let result = probe_source(Path::new("/nonexistent/video.webm"));
        assert!(matches!(result, Err(ProbeError::SourceNotFound(_))));
    }
}
