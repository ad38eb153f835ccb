//! Final compositing: caption burn-in, watermark overlay, and fallbacks.
//!
//! Compositing never fails a clip over presentation. Exactly one overlay
//! strategy applies per clip (chosen by which features were requested), and
//! any encoder failure, timeout, or missing binary degrades straight to
//! copying the rendered clip unchanged, so every rendered clip yields
//! exactly one final output without extra timeout-bounded encoder passes.

mod filters;

pub use filters::{ass_filter, drawtext_filter, escape_drawtext_text, escape_filter_path};

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use thiserror::Error;

use crate::config::{CaptionSettings, RenderSettings};
use crate::logging::BatchLogger;
use crate::media::{locate_tool, run_with_timeout};

/// Errors from compositing. Only the terminal copy can fail.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// Copying the rendered clip to the final location failed.
    #[error("failed to copy {input} to {output}: {source}")]
    Copy {
        input: PathBuf,
        output: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One rung of the fallback ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Burn captions and overlay the watermark in one pass.
    CaptionsAndWatermark,
    /// Burn captions only.
    CaptionsOnly,
    /// Overlay the watermark only.
    WatermarkOnly,
    /// Copy the rendered clip unchanged.
    Copy,
}

impl Strategy {
    /// Human-readable label for logs and the batch summary.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::CaptionsAndWatermark => "captions+watermark",
            Strategy::CaptionsOnly => "captions",
            Strategy::WatermarkOnly => "watermark",
            Strategy::Copy => "copy",
        }
    }
}

/// The single overlay strategy matching the requested features, then
/// [`Strategy::Copy`]. Overlay branches are mutually exclusive per clip: a
/// failed overlay falls directly to the unmodified copy rather than retrying
/// weaker overlays.
pub fn strategy_chain(captions: bool, watermark: bool) -> Vec<Strategy> {
    let overlay = match (captions, watermark) {
        (true, true) => Some(Strategy::CaptionsAndWatermark),
        (true, false) => Some(Strategy::CaptionsOnly),
        (false, true) => Some(Strategy::WatermarkOnly),
        (false, false) => None,
    };
    let mut chain = Vec::with_capacity(2);
    chain.extend(overlay);
    chain.push(Strategy::Copy);
    chain
}

/// Result of compositing one clip.
#[derive(Debug, Clone)]
pub struct ComposeOutcome {
    /// The final output path.
    pub path: PathBuf,
    /// The strategy that ultimately produced the output.
    pub strategy: Strategy,
    /// Whether a richer requested strategy had to be abandoned.
    pub degraded: bool,
}

/// Applies the fallback ladder to one rendered clip.
pub struct Compositor {
    /// None when the encoder is absent; every filter rung is then skipped.
    encoder: Option<PathBuf>,
    captions: CaptionSettings,
    timeout: Duration,
}

impl Compositor {
    /// Locate the encoder on PATH. A missing encoder is not an error here;
    /// it just pins every clip to the copy strategy.
    pub fn new(captions: CaptionSettings, render: &RenderSettings) -> Self {
        Self {
            encoder: locate_tool("ffmpeg").ok(),
            captions,
            timeout: Duration::from_secs(render.compose_timeout_secs),
        }
    }

    /// Use an explicit encoder binary. Intended for tests.
    pub fn with_encoder(
        encoder: Option<PathBuf>,
        captions: CaptionSettings,
        render: &RenderSettings,
    ) -> Self {
        Self {
            encoder,
            captions,
            timeout: Duration::from_secs(render.compose_timeout_secs),
        }
    }

    /// Composite one clip, degrading through the strategy chain as needed.
    ///
    /// `caption_track` is the styled ASS path when captions were requested
    /// and synthesized; `watermark` is the overlay text when requested.
    pub fn compose(
        &self,
        input: &Path,
        output: &Path,
        caption_track: Option<&Path>,
        watermark: Option<&str>,
        logger: &BatchLogger,
    ) -> Result<ComposeOutcome, ComposeError> {
        let chain = strategy_chain(caption_track.is_some(), watermark.is_some());
        let mut degraded = false;

        for strategy in chain {
            if strategy == Strategy::Copy {
                // Always a real copy. A symlink would break when the
                // intermediate clips directory is cleaned up.
                fs::copy(input, output).map_err(|source| ComposeError::Copy {
                    input: input.to_path_buf(),
                    output: output.to_path_buf(),
                    source,
                })?;
                if degraded {
                    logger.warn(&format!(
                        "composited {} as plain copy after filter failures",
                        output.display()
                    ));
                } else {
                    logger.info(&format!("copied {} unchanged", output.display()));
                }
                return Ok(ComposeOutcome {
                    path: output.to_path_buf(),
                    strategy,
                    degraded,
                });
            }

            let Some(encoder) = self.encoder.as_ref() else {
                logger.warn("encoder not found on PATH; falling back to copy");
                degraded = true;
                continue;
            };

            let filter = self.filter_for(strategy, caption_track, watermark);
            let mut cmd = Command::new(encoder);
            cmd.arg("-i")
                .arg(input)
                .arg("-vf")
                .arg(&filter)
                .arg("-c:a")
                .arg("copy")
                .arg("-y")
                .arg(output);
            logger.command(&format!(
                "ffmpeg -i {} -vf \"{}\" -c:a copy -y {}",
                input.display(),
                filter,
                output.display()
            ));

            match run_with_timeout(&mut cmd, "ffmpeg", self.timeout) {
                Ok(_) => {
                    logger.success(&format!(
                        "composited {} ({})",
                        output.display(),
                        strategy.label()
                    ));
                    return Ok(ComposeOutcome {
                        path: output.to_path_buf(),
                        strategy,
                        degraded,
                    });
                }
                Err(err) => {
                    logger.warn(&format!(
                        "{} compositing failed for {}: {}",
                        strategy.label(),
                        output.display(),
                        err
                    ));
                    logger.show_tail("compose");
                    logger.clear_tail();
                    degraded = true;
                }
            }
        }

        unreachable!("strategy chain always terminates in Copy");
    }

    fn filter_for(
        &self,
        strategy: Strategy,
        caption_track: Option<&Path>,
        watermark: Option<&str>,
    ) -> String {
        let ass = caption_track.map(ass_filter);
        let text = watermark.map(|t| drawtext_filter(t, &self.captions));
        match strategy {
            Strategy::CaptionsAndWatermark => {
                format!("{},{}", ass.unwrap_or_default(), text.unwrap_or_default())
            }
            Strategy::CaptionsOnly => ass.unwrap_or_default(),
            Strategy::WatermarkOnly => text.unwrap_or_default(),
            Strategy::Copy => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    #[test]
    fn chain_is_one_overlay_then_copy() {
        assert_eq!(
            strategy_chain(true, true),
            vec![Strategy::CaptionsAndWatermark, Strategy::Copy]
        );
        assert_eq!(
            strategy_chain(true, false),
            vec![Strategy::CaptionsOnly, Strategy::Copy]
        );
        assert_eq!(
            strategy_chain(false, true),
            vec![Strategy::WatermarkOnly, Strategy::Copy]
        );
        assert_eq!(strategy_chain(false, false), vec![Strategy::Copy]);
    }

    fn logger(dir: &Path) -> BatchLogger {
        BatchLogger::new("compose", dir, LogConfig::default(), None).unwrap()
    }

    #[test]
    fn missing_encoder_degrades_to_copy() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        let output = dir.path().join("clip_final.mp4");
        fs::write(&input, b"rendered clip bytes").unwrap();

        let compositor = Compositor::with_encoder(
            None,
            CaptionSettings::default(),
            &RenderSettings::default(),
        );
        let ass = dir.path().join("clip.ass");
        fs::write(&ass, "[Script Info]\n").unwrap();

        let outcome = compositor
            .compose(&input, &output, Some(&ass), Some("@clipforge"), &logger(dir.path()))
            .unwrap();

        assert_eq!(outcome.strategy, Strategy::Copy);
        assert!(outcome.degraded);
        assert_eq!(fs::read(&output).unwrap(), b"rendered clip bytes");
    }

    #[test]
    fn failing_encoder_still_yields_one_final_per_clip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        let output = dir.path().join("clip_final.mp4");
        fs::write(&input, b"payload").unwrap();

        let compositor = Compositor::with_encoder(
            Some(PathBuf::from("/bin/false")),
            CaptionSettings::default(),
            &RenderSettings::default(),
        );

        let outcome = compositor
            .compose(&input, &output, None, Some("@clipforge"), &logger(dir.path()))
            .unwrap();

        assert_eq!(outcome.strategy, Strategy::Copy);
        assert!(outcome.degraded);
        assert!(output.is_file());
        assert!(!output.is_symlink());
    }

    #[test]
    fn working_encoder_uses_the_requested_overlay() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        let output = dir.path().join("clip_final.mp4");
        fs::write(&input, b"payload").unwrap();
        let ass = dir.path().join("clip.ass");
        fs::write(&ass, "[Script Info]\n").unwrap();

        // Stand-in encoder: args are "-i <in> -vf <filter> -c:a copy -y <out>".
        let script = dir.path().join("fake_encoder.sh");
        fs::write(&script, "#!/bin/sh\ncp \"$2\" \"$8\"\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let compositor = Compositor::with_encoder(
            Some(script),
            CaptionSettings::default(),
            &RenderSettings::default(),
        );

        let outcome = compositor
            .compose(&input, &output, Some(&ass), Some("@clipforge"), &logger(dir.path()))
            .unwrap();

        assert_eq!(outcome.strategy, Strategy::CaptionsAndWatermark);
        assert!(!outcome.degraded);
        assert_eq!(fs::read(&output).unwrap(), b"payload");
    }

    #[test]
    fn failed_overlay_falls_straight_to_copy_not_a_weaker_overlay() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        let output = dir.path().join("clip_final.mp4");
        fs::write(&input, b"payload").unwrap();
        let ass = dir.path().join("clip.ass");
        fs::write(&ass, "[Script Info]\n").unwrap();

        // Stand-in encoder that rejects caption burn-in but would accept a
        // watermark-only filter.
        let script = dir.path().join("no_ass_encoder.sh");
        fs::write(
            &script,
            "#!/bin/sh\ncase \"$4\" in *ass=*) exit 1;; esac\ncp \"$2\" \"$8\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let compositor = Compositor::with_encoder(
            Some(script),
            CaptionSettings::default(),
            &RenderSettings::default(),
        );

        let outcome = compositor
            .compose(&input, &output, Some(&ass), Some("@clipforge"), &logger(dir.path()))
            .unwrap();

        assert_eq!(outcome.strategy, Strategy::Copy);
        assert!(outcome.degraded);
        assert_eq!(fs::read(&output).unwrap(), b"payload");
    }

    #[test]
    fn copy_only_request_never_touches_the_encoder() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        let output = dir.path().join("clip_final.mp4");
        fs::write(&input, b"payload").unwrap();

        let compositor = Compositor::with_encoder(
            Some(PathBuf::from("/bin/false")),
            CaptionSettings::default(),
            &RenderSettings::default(),
        );

        let outcome = compositor
            .compose(&input, &output, None, None, &logger(dir.path()))
            .unwrap();

        assert_eq!(outcome.strategy, Strategy::Copy);
        assert!(!outcome.degraded);
    }
}
