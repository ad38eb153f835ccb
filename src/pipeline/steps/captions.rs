//! Captions step: synthesize a styled word-level track per rendered clip.

use crate::captions::{build_word_track, SubtitleSynthesizer};
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, RunState, StepOutcome};

/// Builds word-level caption tracks for the rendered clips.
///
/// Caption trouble never fails a clip: a failed timing lookup, an empty
/// window, or a failed conversion just leaves that clip without a track,
/// and compositing degrades accordingly.
pub struct CaptionStep;

impl PipelineStep for CaptionStep {
    fn name(&self) -> &str {
        "Captions"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if !ctx.request.include_captions {
            return Ok(StepOutcome::Skipped("captions not requested".to_string()));
        }

        let synthesizer = match SubtitleSynthesizer::new(&ctx.settings.captions) {
            Ok(s) => s,
            Err(e) => {
                // Missing converter degrades the whole batch to caption-less
                // finals instead of failing it.
                ctx.logger
                    .warn(&format!("caption converter unavailable: {}", e));
                return Ok(StepOutcome::Skipped("converter not found".to_string()));
            }
        };

        let rendered = state.rendered.clone();
        let total = rendered.len();
        for (i, clip) in rendered.iter().enumerate() {
            let percent = ((i as f64 / total as f64) * 100.0) as u32;
            ctx.report_progress(
                self.name(),
                percent,
                &format!("Captioning clip {} of {}", i + 1, total),
            );

            let words = match ctx.word_timings.words_for_window(clip.start_ms, clip.end_ms) {
                Ok(words) => words,
                Err(e) => {
                    ctx.logger.warn(&format!(
                        "word timing lookup failed for '{}': {}",
                        clip.basename, e
                    ));
                    Vec::new()
                }
            };
            let track = build_word_track(&words, clip.start_ms);

            match synthesizer.synthesize(&clip.basename, &track, &ctx.layout, &ctx.logger) {
                Ok(Some(path)) => {
                    state.caption_tracks.insert(clip.basename.clone(), path);
                }
                Ok(None) => {}
                Err(e) => {
                    ctx.logger.warn(&format!(
                        "caption synthesis failed for '{}': {}",
                        clip.basename, e
                    ));
                }
            }
        }

        ctx.logger.info(&format!(
            "Synthesized {} caption tracks for {} clips",
            state.caption_tracks.len(),
            total
        ));
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        for path in state.caption_tracks.values() {
            if !path.is_file() {
                return Err(StepError::invalid_output(format!(
                    "styled track missing on disk: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
