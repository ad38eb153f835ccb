//! Extract step: probe the source and render each clip.

use crate::extract::{plan_clip, ClipExtractor};
use crate::media::{self, ProbeError};
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, RunState, SkippedClip, StepOutcome};

/// Renders every valid descriptor into a trimmed, cropped, faded clip.
///
/// Per-clip failures (validation skips, exhausted encode profiles) are
/// logged and recorded but never fatal; the step fails only when the source
/// cannot be probed or no clip at all could be rendered.
pub struct ExtractStep;

impl PipelineStep for ExtractStep {
    fn name(&self) -> &str {
        "Extract"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.descriptors.is_empty() {
            return Err(StepError::invalid_input("no clip descriptors supplied"));
        }
        let source = ctx.layout.source_video();
        if !source.is_file() {
            return Err(StepError::file_not_found(source.display().to_string()));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let source_path = ctx.layout.source_video();
        let source = media::probe_source(&source_path).map_err(|e| match e {
            ProbeError::SourceNotFound(path) => StepError::file_not_found(path),
            other => StepError::other(other.to_string()),
        })?;
        ctx.logger.info(&format!(
            "Source: {}x{}, {:.3}s",
            source.width, source.height, source.duration_secs
        ));

        let extractor = ClipExtractor::new(ctx.settings.render.clone())
            .map_err(|e| StepError::precondition_failed(e.to_string()))?;

        let total = ctx.descriptors.len();
        for (index, descriptor) in ctx.descriptors.iter().enumerate() {
            let percent = ((index as f64 / total as f64) * 100.0) as u32;
            ctx.report_progress(
                self.name(),
                percent,
                &format!("Rendering clip {} of {}", index + 1, total),
            );
            ctx.logger.progress(percent);

            let plan = match plan_clip(
                descriptor,
                index,
                &source,
                ctx.request.aspect_ratio,
                &ctx.settings.render,
            ) {
                Ok(plan) => plan,
                Err(reason) => {
                    ctx.logger.warn(&format!(
                        "Skipping clip {} '{}': {}",
                        index + 1,
                        descriptor.title,
                        reason
                    ));
                    state.skipped.push(SkippedClip {
                        index,
                        title: descriptor.title.clone(),
                        reason: reason.to_string(),
                    });
                    continue;
                }
            };

            let output_path = ctx.layout.clip_video(&plan.basename);
            match extractor.extract(&plan, &source, &source_path, &output_path, &ctx.logger) {
                Ok(rendered) => state.rendered.push(rendered),
                Err(e) => {
                    ctx.logger.error(&format!(
                        "Clip {} '{}' could not be rendered: {}",
                        index + 1,
                        descriptor.title,
                        e
                    ));
                    state.skipped.push(SkippedClip {
                        index,
                        title: descriptor.title.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        state.source = Some(source);

        if state.rendered.is_empty() {
            return Err(StepError::other(format!(
                "none of the {} descriptors produced a clip",
                total
            )));
        }
        ctx.logger.info(&format!(
            "Rendered {} of {} clips ({} skipped)",
            state.rendered.len(),
            total,
            state.skipped.len()
        ));
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.source.is_none() {
            return Err(StepError::invalid_output("source probe not recorded"));
        }
        for clip in &state.rendered {
            if !clip.path.is_file() {
                return Err(StepError::invalid_output(format!(
                    "rendered clip missing on disk: {}",
                    clip.path.display()
                )));
            }
        }
        Ok(())
    }
}
