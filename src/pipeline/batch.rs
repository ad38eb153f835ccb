//! Batch runner: admission, wiring, and status bookkeeping for one run.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;

use crate::artifacts::OutputLayout;
use crate::captions::WordTimingSource;
use crate::config::Settings;
use crate::logging::BatchLogger;
use crate::models::{BatchRequest, ClipDescriptor};
use crate::status::StatusHandle;

use super::errors::{PipelineError, PipelineResult};
use super::runner::Pipeline;
use super::steps::{CaptionStep, ComposeStep, ExtractStep, SummaryStep};
use super::types::{Context, RunState, SkippedClip};

/// What a finished batch produced.
#[derive(Debug)]
pub struct BatchReport {
    /// Batch identifier (also the log file stem).
    pub batch_name: String,
    /// Number of clips rendered.
    pub rendered: usize,
    /// Descriptors that were skipped, with reasons.
    pub skipped: Vec<SkippedClip>,
    /// Final composited clip paths, in batch order.
    pub finals: Vec<PathBuf>,
    /// Summary document path, when the write succeeded.
    pub summary_path: Option<PathBuf>,
    /// Batch log file path.
    pub log_path: PathBuf,
}

/// Runs batches one at a time, keeping the shared status record current.
pub struct BatchRunner {
    settings: Settings,
    status: StatusHandle,
}

impl BatchRunner {
    /// Create a runner with an idle status record.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            status: StatusHandle::new(),
        }
    }

    /// Handle for polling batch progress (and for admission control).
    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Run one batch to completion.
    ///
    /// Rejects the request if a batch is already running. On any exit the
    /// status record reflects the outcome, so pollers see `complete` or
    /// `failed` rather than a stuck `running`.
    pub fn run_batch(
        &self,
        request: BatchRequest,
        descriptors: Vec<ClipDescriptor>,
        word_timings: Arc<dyn WordTimingSource>,
    ) -> PipelineResult<BatchReport> {
        if !self.status.try_begin() {
            return Err(PipelineError::AlreadyRunning);
        }

        let batch_name = format!("batch_{}", Local::now().format("%Y%m%d_%H%M%S"));
        match self.run_admitted(&batch_name, request, descriptors, word_timings) {
            Ok(report) => {
                self.status
                    .complete(&format!("Generated {} clips", report.finals.len()));
                Ok(report)
            }
            Err(e) => {
                self.status.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn run_admitted(
        &self,
        batch_name: &str,
        request: BatchRequest,
        descriptors: Vec<ClipDescriptor>,
        word_timings: Arc<dyn WordTimingSource>,
    ) -> PipelineResult<BatchReport> {
        let layout = OutputLayout::new(self.settings.paths.clone());
        layout
            .ensure_dirs()
            .map_err(|e| PipelineError::setup_failed(batch_name, e.to_string()))?;

        let logger = Arc::new(
            BatchLogger::new(
                batch_name,
                layout.logs_dir(),
                self.settings.logging.to_log_config(),
                None,
            )
            .map_err(|e| PipelineError::setup_failed(batch_name, e.to_string()))?,
        );
        let log_path = logger.log_path().to_path_buf();
        logger.info(&format!(
            "Batch '{}': {} descriptors, aspect {}, captions={}, watermark={}",
            batch_name,
            descriptors.len(),
            request.aspect_ratio.as_str(),
            request.include_captions,
            request.include_watermark
        ));

        let status = self.status.clone();
        let ctx = Context::new(
            request,
            self.settings.clone(),
            batch_name,
            layout,
            descriptors,
            word_timings,
            Arc::clone(&logger),
        )
        .with_progress_callback(Box::new(move |step, percent, message| {
            status.set_stage(step, message);
            status.set_percent(percent);
        }));

        let pipeline = Pipeline::new()
            .with_step(ExtractStep)
            .with_step(CaptionStep)
            .with_step(ComposeStep)
            .with_step(SummaryStep);

        let mut state = RunState::default();
        let run = pipeline.run(&ctx, &mut state);
        logger.close();
        run?;

        for path in &state.finals {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                self.status.push_clip(name);
            }
        }

        Ok(BatchReport {
            batch_name: batch_name.to_string(),
            rendered: state.rendered.len(),
            skipped: state.skipped,
            finals: state.finals,
            summary_path: state.summary_path,
            log_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::StaticWordTimings;
    use crate::status::BatchState;
    use tempfile::tempdir;

    fn runner(work_root: &std::path::Path) -> BatchRunner {
        let mut settings = Settings::default();
        settings.paths.work_root = work_root.display().to_string();
        BatchRunner::new(settings)
    }

    fn descriptor() -> ClipDescriptor {
        ClipDescriptor {
            title: "Intro".to_string(),
            start: "00:00:00.000".to_string(),
            end: "00:00:05.000".to_string(),
            summary: String::new(),
            full_text: String::new(),
        }
    }

    #[test]
    fn concurrent_batch_is_rejected() {
        let dir = tempdir().unwrap();
        let runner = runner(dir.path());
        assert!(runner.status_handle().try_begin());

        let err = runner
            .run_batch(
                BatchRequest::default(),
                vec![descriptor()],
                Arc::new(StaticWordTimings::default()),
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::AlreadyRunning));
    }

    #[test]
    fn missing_source_fails_the_batch_and_marks_status() {
        let dir = tempdir().unwrap();
        let runner = runner(dir.path());

        let err = runner
            .run_batch(
                BatchRequest::default(),
                vec![descriptor()],
                Arc::new(StaticWordTimings::default()),
            )
            .unwrap_err();

        assert!(err.to_string().contains("Extract"));
        let status = runner.status_handle().snapshot();
        assert_eq!(status.state, BatchState::Failed);
        assert!(status.error.is_some());
    }

    #[test]
    fn failed_batch_releases_admission() {
        let dir = tempdir().unwrap();
        let runner = runner(dir.path());

        let _ = runner.run_batch(
            BatchRequest::default(),
            vec![descriptor()],
            Arc::new(StaticWordTimings::default()),
        );
        // A new batch may be admitted after failure.
        assert!(runner.status_handle().try_begin());
    }

    #[test]
    fn empty_descriptor_list_is_rejected_up_front() {
        let dir = tempdir().unwrap();
        let runner = runner(dir.path());

        let err = runner
            .run_batch(
                BatchRequest::default(),
                Vec::new(),
                Arc::new(StaticWordTimings::default()),
            )
            .unwrap_err();
        assert!(err.to_string().contains("no clip descriptors"));
    }
}
