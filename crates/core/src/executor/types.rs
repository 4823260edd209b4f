//! Job types for the executor.

use std::path::PathBuf;

use crate::processor::{ProcessorInvocation, ProcessorOutput};

/// A unit of deferred work. The ticket row is inserted before the job is
/// submitted; the workspace is owned by the job from submission until the
/// publisher deletes it.
#[derive(Debug, Clone)]
pub struct Job {
    pub ticket: String,
    /// Workspace-resident input (after archive extraction).
    pub input: PathBuf,
    /// The job's workspace directory, removed after publication.
    pub workspace: PathBuf,
    /// Input size captured at submission, for the accounting log.
    pub filesize: u64,
    pub invocation: ProcessorInvocation,
}

/// Outcome of exactly one processor invocation.
#[derive(Debug)]
pub struct JobOutcome {
    pub ticket: String,
    pub namespace: &'static str,
    pub workspace: PathBuf,
    pub filesize: u64,
    /// `Some` iff the processor returned normally.
    pub output: Option<ProcessorOutput>,
    /// Error message when the processor failed.
    pub comment: Option<String>,
}

impl JobOutcome {
    pub fn success(&self) -> bool {
        self.output.is_some()
    }
}
