//! Error types for the processor seam.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a processor invocation. In the prompt flow these become
/// an error response; in the deferred flow they are captured into the
/// ticket's `success`/`comment` fields and never escape the worker.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Profiler tool not found.
    #[error("Profiler command not found at path: {path}")]
    CommandNotFound { path: PathBuf },

    /// Input file not found.
    #[error("File not found")]
    InputNotFound { path: PathBuf },

    /// Domain computation failed (unreadable file, unsupported CRS, parse
    /// failure, ...).
    #[error("Processing failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// Processing timed out.
    #[error("Processing timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to parse the profiler tool output.
    #[error("Failed to parse profiler output: {reason}")]
    ParseError { reason: String },

    /// I/O error during processing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessorError {
    /// Creates a new processing failure with the tool's stderr attached.
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            stderr,
        }
    }
}
