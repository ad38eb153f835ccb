//! Core types for the batch pipeline.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::artifacts::OutputLayout;
use crate::captions::WordTimingSource;
use crate::config::Settings;
use crate::logging::BatchLogger;
use crate::media::SourceInfo;
use crate::models::{BatchRequest, ClipDescriptor, RenderedClip};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Contains the batch request and shared resources that steps can read
/// but not modify. Mutable state goes in [`RunState`].
pub struct Context {
    /// Caller-supplied batch parameters.
    pub request: BatchRequest,
    /// Application settings.
    pub settings: Settings,
    /// Batch name/identifier (also the log file stem).
    pub batch_name: String,
    /// Batch-scoped output layout.
    pub layout: OutputLayout,
    /// Clip descriptors from the selection collaborator, in batch order.
    pub descriptors: Vec<ClipDescriptor>,
    /// Absolute word timings for the source video.
    pub word_timings: Arc<dyn WordTimingSource>,
    /// Per-batch logger.
    pub logger: Arc<BatchLogger>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a batch.
    pub fn new(
        request: BatchRequest,
        settings: Settings,
        batch_name: impl Into<String>,
        layout: OutputLayout,
        descriptors: Vec<ClipDescriptor>,
        word_timings: Arc<dyn WordTimingSource>,
        logger: Arc<BatchLogger>,
    ) -> Self {
        Self {
            request,
            settings,
            batch_name: batch_name.into(),
            layout,
            descriptors,
            word_timings,
            logger,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to the callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }
}

/// A descriptor the extract step passed over, with the reason logged.
#[derive(Debug, Clone)]
pub struct SkippedClip {
    /// Zero-based descriptor index.
    pub index: usize,
    /// Descriptor title.
    pub title: String,
    /// Human-readable skip reason.
    pub reason: String,
}

/// Mutable batch state that accumulates results from pipeline steps.
///
/// Steps add new data but do not overwrite what earlier steps recorded.
#[derive(Default)]
pub struct RunState {
    /// Probed source facts (from the Extract step).
    pub source: Option<SourceInfo>,
    /// Clips rendered by the Extract step, in batch order.
    pub rendered: Vec<RenderedClip>,
    /// Descriptors skipped during extraction.
    pub skipped: Vec<SkippedClip>,
    /// Styled caption tracks keyed by clip basename (from the Captions step).
    pub caption_tracks: HashMap<String, PathBuf>,
    /// Rendered clips whose files had vanished before compositing.
    pub missing_inputs: usize,
    /// Final composited clip paths, in batch order.
    pub finals: Vec<PathBuf>,
    /// Batch summary document path, when the write succeeded.
    pub summary_path: Option<PathBuf>,
}

impl RunState {
    /// Check if extraction produced at least one clip.
    pub fn has_rendered(&self) -> bool {
        !self.rendered.is_empty()
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (not requested or nothing to do; not an error).
    Skipped(String),
}
