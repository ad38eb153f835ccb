//! Shared batch status record.
//!
//! One batch runs at a time; callers poll a snapshot of this record while
//! the pipeline mutates it from the worker thread. The handle is the
//! admission gate: a second batch is rejected while one is running.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

/// Lifecycle of the current (or most recent) batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// No batch has run yet, or the record was reset.
    Idle,
    /// A batch is currently executing.
    Running,
    /// The last batch finished successfully.
    Complete,
    /// The last batch failed.
    Failed,
}

/// Snapshot of batch progress, shaped for polling clients.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStatus {
    /// Current lifecycle state.
    pub state: BatchState,
    /// Name of the pipeline stage currently executing.
    pub stage: String,
    /// Human-readable progress message.
    pub message: String,
    /// Overall percent complete (0-100).
    pub percent: u32,
    /// Final clip file names produced so far.
    pub clips: Vec<String>,
    /// Failure description when `state` is `Failed`.
    pub error: Option<String>,
}

impl Default for BatchStatus {
    fn default() -> Self {
        Self {
            state: BatchState::Idle,
            stage: String::new(),
            message: String::new(),
            percent: 0,
            clips: Vec::new(),
            error: None,
        }
    }
}

/// Cloneable handle to the shared status record.
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<Mutex<BatchStatus>>,
}

impl StatusHandle {
    /// Create a handle with an idle record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status, by value.
    pub fn snapshot(&self) -> BatchStatus {
        self.inner.lock().clone()
    }

    /// Claim the record for a new batch.
    ///
    /// Returns false without touching the record if a batch is already
    /// running. On success the record is reset to a fresh running state.
    pub fn try_begin(&self) -> bool {
        let mut status = self.inner.lock();
        if status.state == BatchState::Running {
            return false;
        }
        *status = BatchStatus {
            state: BatchState::Running,
            message: "Starting batch".to_string(),
            ..BatchStatus::default()
        };
        true
    }

    /// Record entry into a named stage.
    pub fn set_stage(&self, stage: &str, message: &str) {
        let mut status = self.inner.lock();
        status.stage = stage.to_string();
        status.message = message.to_string();
    }

    /// Update the progress message without changing the stage.
    pub fn set_message(&self, message: &str) {
        self.inner.lock().message = message.to_string();
    }

    /// Update overall percent complete.
    pub fn set_percent(&self, percent: u32) {
        self.inner.lock().percent = percent.min(100);
    }

    /// Append a finished final clip file name.
    pub fn push_clip(&self, name: &str) {
        self.inner.lock().clips.push(name.to_string());
    }

    /// Mark the batch complete.
    pub fn complete(&self, message: &str) {
        let mut status = self.inner.lock();
        status.state = BatchState::Complete;
        status.message = message.to_string();
        status.percent = 100;
        status.error = None;
    }

    /// Mark the batch failed.
    pub fn fail(&self, error: &str) {
        let mut status = self.inner.lock();
        status.state = BatchState::Failed;
        status.message = "Batch failed".to_string();
        status.error = Some(error.to_string());
    }
}
