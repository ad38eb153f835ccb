//! Per-clip extraction: trim, crop, fade, render.
//!
//! Planning is pure and separated from execution so validation policy can be
//! tested without an encoder. A descriptor that fails validation produces a
//! [`SkipReason`], which callers log before moving to the next clip; only
//! encoder failures (after the profile fallback) surface as errors, and even
//! those fail one clip, never the batch.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use thiserror::Error;

use crate::artifacts::sanitize_title;
use crate::config::RenderSettings;
use crate::logging::BatchLogger;
use crate::media::{self, SourceInfo, ToolError};
use crate::models::{AspectRatio, ClipDescriptor, RenderedClip};

use super::geometry::{crop_for_aspect, CropWindow};
use super::profiles::encode_profiles;

/// Why a descriptor was skipped instead of extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// `start >= end` or a negative start (including the parse sentinel).
    InvalidRange { start_secs: f64, end_secs: f64 },
    /// The source frame has a non-positive dimension.
    DegenerateGeometry { width: u32, height: u32 },
    /// The trim produced a non-positive duration.
    DegenerateDuration { duration_secs: f64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange {
                start_secs,
                end_secs,
            } => write!(
                f,
                "invalid time range: start={:.3}s end={:.3}s",
                start_secs, end_secs
            ),
            Self::DegenerateGeometry { width, height } => {
                write!(f, "unusable frame geometry: {}x{}", width, height)
            }
            Self::DegenerateDuration { duration_secs } => {
                write!(f, "non-positive duration: {:.3}s", duration_secs)
            }
        }
    }
}

/// Errors from executing an extraction plan.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Every encode profile failed for this clip.
    #[error("all encode profiles failed for '{basename}': {last_error}")]
    AllProfilesFailed {
        basename: String,
        #[source]
        last_error: ToolError,
    },

    /// The encoder binary is missing entirely.
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// A validated, fully resolved extraction for one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlan {
    /// Zero-based descriptor index.
    pub index: usize,
    /// Original descriptor title.
    pub title: String,
    /// Deterministic `{index+1}_{sanitized_title}` artifact stem.
    pub basename: String,
    /// Trim start on the source timeline, seconds.
    pub start_secs: f64,
    /// Trim end on the source timeline, seconds (already clamped).
    pub end_secs: f64,
    /// Whether the descriptor's end overran the source and was clamped.
    pub end_clamped: bool,
    /// Crop window, if the aspect policy applies one.
    pub crop: Option<CropWindow>,
    /// Symmetric fade duration at each boundary, if the clip is long enough.
    pub fade_secs: Option<f64>,
}

impl ClipPlan {
    /// Effective clip duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Effective pixel dimensions after cropping.
    pub fn dimensions(&self, source: &SourceInfo) -> (u32, u32) {
        match self.crop {
            Some(window) => (window.width, window.height),
            None => (source.width, source.height),
        }
    }

    /// Build the ffmpeg video filter graph for this plan, if any stage
    /// (crop or fades) applies.
    pub fn filter_graph(&self) -> Option<String> {
        let mut stages: Vec<String> = Vec::new();
        if let Some(window) = self.crop {
            stages.push(window.to_filter());
        }
        if let Some(fade) = self.fade_secs {
            let duration = self.duration_secs();
            stages.push(format!("fade=t=in:st=0:d={:.3}", fade));
            stages.push(format!("fade=t=out:st={:.3}:d={:.3}", duration - fade, fade));
        }
        if stages.is_empty() {
            None
        } else {
            Some(stages.join(","))
        }
    }
}

/// Symmetric fade duration for a clip, or `None` when the clip is too short
/// to fade.
pub fn fade_duration(duration_secs: f64, render: &RenderSettings) -> Option<f64> {
    if duration_secs <= render.fade_threshold_secs {
        return None;
    }
    let fade = render.fade_max_secs.min(duration_secs / 4.0);
    if !fade.is_finite() || fade <= 0.0 {
        return None;
    }
    Some(fade)
}

/// Validate a descriptor against the probed source and resolve it into an
/// extraction plan.
pub fn plan_clip(
    descriptor: &ClipDescriptor,
    index: usize,
    source: &SourceInfo,
    aspect: AspectRatio,
    render: &RenderSettings,
) -> Result<ClipPlan, SkipReason> {
    let start_secs = descriptor.start_seconds();
    let mut end_secs = descriptor.end_seconds();

    if start_secs >= end_secs || start_secs < 0.0 {
        return Err(SkipReason::InvalidRange {
            start_secs,
            end_secs,
        });
    }

    // Selection boundaries may slightly overrun the source; clamp rather
    // than reject.
    let mut end_clamped = false;
    if end_secs > source.duration_secs {
        end_secs = source.duration_secs - render.end_epsilon_secs;
        end_clamped = true;
        if start_secs >= end_secs {
            return Err(SkipReason::InvalidRange {
                start_secs,
                end_secs,
            });
        }
    }

    if source.width == 0 || source.height == 0 {
        return Err(SkipReason::DegenerateGeometry {
            width: source.width,
            height: source.height,
        });
    }

    let duration_secs = end_secs - start_secs;
    if duration_secs <= 0.0 {
        return Err(SkipReason::DegenerateDuration { duration_secs });
    }

    Ok(ClipPlan {
        index,
        title: descriptor.title.clone(),
        basename: format!("{}_{}", index + 1, sanitize_title(&descriptor.title)),
        start_secs,
        end_secs,
        end_clamped,
        crop: crop_for_aspect(source.width, source.height, aspect),
        fade_secs: fade_duration(duration_secs, render),
    })
}

/// Executes extraction plans against ffmpeg.
pub struct ClipExtractor {
    ffmpeg: PathBuf,
    render: RenderSettings,
}

impl ClipExtractor {
    /// Locate ffmpeg and build an extractor.
    pub fn new(render: RenderSettings) -> Result<Self, ToolError> {
        let ffmpeg = media::locate_tool("ffmpeg")?;
        Ok(Self { ffmpeg, render })
    }

    /// Build an extractor around an explicit encoder binary (for tests).
    pub fn with_encoder(ffmpeg: PathBuf, render: RenderSettings) -> Self {
        Self { ffmpeg, render }
    }

    /// Render one planned clip to `output_path`.
    ///
    /// Tries each encode profile in order; the clip fails only when every
    /// profile has failed. The encoder writes the file directly, so no
    /// per-clip state survives this call on any exit path.
    pub fn extract(
        &self,
        plan: &ClipPlan,
        source: &SourceInfo,
        source_path: &Path,
        output_path: &Path,
        logger: &BatchLogger,
    ) -> Result<RenderedClip, ExtractError> {
        let timeout = Duration::from_secs(self.render.encode_timeout_secs);
        let mut last_error: Option<ToolError> = None;

        for profile in encode_profiles() {
            let mut cmd = Command::new(&self.ffmpeg);
            cmd.arg("-ss")
                .arg(format!("{:.3}", plan.start_secs))
                .arg("-i")
                .arg(source_path)
                .arg("-t")
                .arg(format!("{:.3}", plan.duration_secs()));

            if let Some(graph) = plan.filter_graph() {
                cmd.arg("-vf").arg(graph);
            }

            cmd.arg("-c:v").arg("libx264").arg("-preset").arg(profile.preset);
            if let Some(codec) = profile.audio_codec {
                cmd.arg("-c:a").arg(codec);
            }
            cmd.arg("-y").arg(output_path);

            logger.command(&format!("{:?}", cmd));
            logger.clear_tail();

            match media::run_with_timeout(&mut cmd, "ffmpeg", timeout) {
                Ok(output) => {
                    for line in &output.stderr_tail {
                        logger.tool_output(line);
                    }
                    let (width, height) = plan.dimensions(source);
                    logger.success(&format!(
                        "Rendered '{}' with {} profile ({}x{}, {:.3}s)",
                        plan.basename,
                        profile.name,
                        width,
                        height,
                        plan.duration_secs()
                    ));
                    return Ok(RenderedClip {
                        index: plan.index,
                        title: plan.title.clone(),
                        basename: plan.basename.clone(),
                        path: output_path.to_path_buf(),
                        width,
                        height,
                        duration_secs: plan.duration_secs(),
                        start_ms: crate::timecode::seconds_to_milliseconds(plan.start_secs),
                        end_ms: crate::timecode::seconds_to_milliseconds(plan.end_secs),
                    });
                }
                Err(e) => {
                    logger.warn(&format!(
                        "Encode profile '{}' failed for '{}': {}",
                        profile.name, plan.basename, e
                    ));
                    logger.show_tail("encode");
                    last_error = Some(e);
                }
            }
        }

        Err(ExtractError::AllProfilesFailed {
            basename: plan.basename.clone(),
            last_error: last_error.unwrap_or(ToolError::NotFound {
                tool: "ffmpeg".to_string(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceInfo {
        SourceInfo {
            width: 1920,
            height: 1080,
            duration_secs: 600.0,
        }
    }

    fn descriptor(title: &str, start: &str, end: &str) -> ClipDescriptor {
        ClipDescriptor {
            title: title.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            summary: String::new(),
            full_text: String::new(),
        }
    }

    #[test]
    fn equal_start_and_end_is_skipped() {
        let d = descriptor("x", "00:00:10.000", "00:00:10.000");
        let result = plan_clip(&d, 0, &source(), AspectRatio::Original, &RenderSettings::default());
        assert!(matches!(result, Err(SkipReason::InvalidRange { .. })));
    }

    #[test]
    fn malformed_start_parses_to_sentinel_and_is_skipped() {
        // A bad start parses to 0.0; with end also bad, the range collapses.
        let d = descriptor("x", "garbage", "more garbage");
        let result = plan_clip(&d, 0, &source(), AspectRatio::Original, &RenderSettings::default());
        assert!(matches!(result, Err(SkipReason::InvalidRange { .. })));
    }

    #[test]
    fn overrunning_end_is_clamped_not_rejected() {
        let d = descriptor("x", "00:09:30.000", "00:10:30.000");
        let plan = plan_clip(&d, 0, &source(), AspectRatio::Original, &RenderSettings::default())
            .unwrap();
        assert!(plan.end_clamped);
        assert!((plan.end_secs - 599.9).abs() < 1e-9);
    }

    #[test]
    fn basename_is_deterministic_and_indexed() {
        let d = descriptor("Wow!! #1 *Secret*", "00:00:00.000", "00:00:30.000");
        let plan = plan_clip(&d, 2, &source(), AspectRatio::Original, &RenderSettings::default())
            .unwrap();
        assert_eq!(plan.basename, "3_Wow 1 Secret");
    }

    #[test]
    fn fade_policy_matches_thresholds() {
        let render = RenderSettings::default();
        assert_eq!(fade_duration(0.8, &render), None);
        assert_eq!(fade_duration(6.0, &render), Some(0.5));
        assert_eq!(fade_duration(1.5, &render), Some(0.375));
    }

    #[test]
    fn filter_graph_combines_crop_and_fades() {
        let d = descriptor("x", "00:00:00.000", "00:00:06.000");
        let plan = plan_clip(&d, 0, &source(), AspectRatio::Portrait, &RenderSettings::default())
            .unwrap();
        let graph = plan.filter_graph().unwrap();
        assert!(graph.starts_with("crop=607:1080:656:0,"));
        assert!(graph.contains("fade=t=in:st=0:d=0.500"));
        assert!(graph.contains("fade=t=out:st=5.500:d=0.500"));
    }

    #[test]
    fn short_clip_has_no_fade_stage() {
        let d = descriptor("x", "00:00:00.000", "00:00:00.900");
        let plan = plan_clip(&d, 0, &source(), AspectRatio::Original, &RenderSettings::default())
            .unwrap();
        assert!(plan.fade_secs.is_none());
        assert!(plan.filter_graph().is_none());
    }

    #[test]
    fn zero_dimension_source_is_skipped() {
        let bad = SourceInfo {
            width: 0,
            height: 1080,
            duration_secs: 600.0,
        };
        let d = descriptor("x", "00:00:00.000", "00:00:30.000");
        let result = plan_clip(&d, 0, &bad, AspectRatio::Original, &RenderSettings::default());
        assert!(matches!(result, Err(SkipReason::DegenerateGeometry { .. })));
    }
}
