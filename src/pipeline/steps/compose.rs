//! Compose step: produce one final output per rendered clip.

use crate::compose::Compositor;
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, RunState, StepOutcome};

/// Composites captions and watermark onto each rendered clip.
///
/// The compositor's fallback ladder guarantees an output for every clip it
/// is given; the only fatal condition here is the terminal copy failing,
/// which means the filesystem itself is broken.
pub struct ComposeStep;

impl PipelineStep for ComposeStep {
    fn name(&self) -> &str {
        "Compose"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if state.rendered.is_empty() {
            return Err(StepError::precondition_failed("no rendered clips"));
        }

        let compositor = Compositor::new(ctx.settings.captions.clone(), &ctx.settings.render);
        let watermark = ctx
            .request
            .include_watermark
            .then_some(ctx.request.watermark_text.as_str());

        let rendered = state.rendered.clone();
        let total = rendered.len();
        for (i, clip) in rendered.iter().enumerate() {
            let percent = ((i as f64 / total as f64) * 100.0) as u32;
            ctx.report_progress(
                self.name(),
                percent,
                &format!("Compositing clip {} of {}", i + 1, total),
            );
            ctx.logger.progress(percent);

            if !clip.path.is_file() {
                ctx.logger.warn(&format!(
                    "rendered clip vanished before compositing: {}",
                    clip.path.display()
                ));
                state.missing_inputs += 1;
                continue;
            }

            let caption_track = state
                .caption_tracks
                .get(&clip.basename)
                .map(|p| p.as_path());
            let output = ctx.layout.final_clip(&clip.basename);

            let outcome = compositor
                .compose(&clip.path, &output, caption_track, watermark, &ctx.logger)
                .map_err(|e| StepError::other(e.to_string()))?;
            state.finals.push(outcome.path);
        }

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        // Every rendered clip that was still on disk must have a final.
        let expected = state.rendered.len() - state.missing_inputs;
        if state.finals.len() != expected {
            return Err(StepError::invalid_output(format!(
                "expected {} final clips, found {}",
                expected,
                state.finals.len()
            )));
        }
        for path in &state.finals {
            if !path.is_file() {
                return Err(StepError::invalid_output(format!(
                    "final clip missing on disk: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
