//! Trait definition for the processor seam.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use super::error::ProcessorError;
use super::types::{DatasetOutput, ResourceKind};
use crate::params::{NormalizeParams, ProfileParams, SummarizeParams};

/// A processor that can profile, normalize and summarize geospatial
/// datasets.
///
/// Implementations run synchronously from the caller's point of view and
/// report domain failures through `ProcessorError` with a human-readable
/// message; they never panic on malformed input.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Returns the name of this processor implementation.
    fn name(&self) -> &str;

    /// Compute a descriptive report for a workspace-resident dataset.
    async fn profile(
        &self,
        input: &Path,
        kind: ResourceKind,
        params: &ProfileParams,
    ) -> Result<Value, ProcessorError>;

    /// Apply the requested normalizations, producing a new dataset inside
    /// the workspace.
    async fn normalize(
        &self,
        input: &Path,
        params: &NormalizeParams,
    ) -> Result<DatasetOutput, ProcessorError>;

    /// Compute summaries (samples, histograms) for a tabular/vector dataset.
    async fn summarize(
        &self,
        input: &Path,
        params: &SummarizeParams,
    ) -> Result<Value, ProcessorError>;

    /// Validates that the processor is properly configured and ready.
    async fn validate(&self) -> Result<(), ProcessorError>;
}
