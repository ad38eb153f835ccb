//! Sequential batch pipeline.
//!
//! A batch flows through four steps in fixed order: Extract, Captions,
//! Compose, Summary. The runner validates before and after each step and
//! the batch runner keeps the shared status record current for pollers.

mod batch;
mod errors;
mod runner;
mod step;
mod steps;
mod types;

pub use batch::{BatchReport, BatchRunner};
pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use runner::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{CaptionStep, ComposeStep, ExtractStep, SummaryStep};
pub use types::{Context, ProgressCallback, RunState, SkippedClip, StepOutcome};
