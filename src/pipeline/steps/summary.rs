//! Summary step: write the human-readable batch record.

use crate::artifacts::{write_batch_summary, ClipReport};
use crate::pipeline::errors::StepResult;
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, RunState, StepOutcome};

/// Writes `clip_data_summary.txt` next to the final clips.
///
/// Best-effort: the summary is descriptive, so a write failure is logged
/// and the batch still succeeds.
pub struct SummaryStep;

impl PipelineStep for SummaryStep {
    fn name(&self) -> &str {
        "Summary"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let reports: Vec<ClipReport> = state
            .rendered
            .iter()
            .filter_map(|clip| ctx.descriptors.get(clip.index))
            .map(|d| ClipReport {
                title: d.title.clone(),
                start: d.start.clone(),
                end: d.end.clone(),
                summary: d.summary.clone(),
                full_text: d.full_text.clone(),
            })
            .collect();

        let path = ctx.layout.summary_file();
        match write_batch_summary(&path, &ctx.request, &reports) {
            Ok(()) => {
                ctx.logger
                    .info(&format!("Batch summary written: {}", path.display()));
                state.summary_path = Some(path);
            }
            Err(e) => {
                ctx.logger
                    .warn(&format!("could not write batch summary: {}", e));
            }
        }

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
        Ok(())
    }
}
