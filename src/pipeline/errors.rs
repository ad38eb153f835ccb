//! Error types for the batch pipeline.
//!
//! Errors carry context that chains through layers:
//! Batch → Step → Operation → Detail

use std::io;

use thiserror::Error;

/// Top-level pipeline error with batch context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Batch '{batch_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        batch_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Input validation failed before the pipeline started.
    #[error("Batch '{batch_name}' failed validation: {message}")]
    ValidationFailed { batch_name: String, message: String },

    /// Another batch is already running.
    #[error("A batch is already running; try again when it finishes")]
    AlreadyRunning,

    /// Failed to set up the batch (create directories, open log, etc.).
    #[error("Batch '{batch_name}' setup failed: {message}")]
    SetupFailed { batch_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        batch_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            batch_name: batch_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a validation failed error.
    pub fn validation_failed(batch_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            batch_name: batch_name.into(),
            message: message.into(),
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(batch_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            batch_name: batch_name.into(),
            message: message.into(),
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A required file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// Generic step error with message.
    #[error("{0}")]
    Other(String),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
