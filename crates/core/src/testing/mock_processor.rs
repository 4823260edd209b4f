//! Mock processor for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::params::{NormalizeParams, ProfileParams, SummarizeParams};
use crate::exporter::ExportFormat;
use crate::processor::{
    normalized_base_name, DatasetOutput, Processor, ProcessorError, ResourceKind,
};

/// A recorded processor call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// "profile", "normalize" or "summarize".
    pub operation: String,
    pub input: PathBuf,
}

/// Mock implementation of the [`Processor`] trait.
///
/// Provides controllable behavior for testing:
/// - Track invocations for assertions
/// - Simulate success/failure
/// - Control the returned report
/// - Simulate slow processing
///
/// Normalize calls write a real dataset next to the input so that the
/// exporter and publisher operate on actual files.
pub struct MockProcessor {
    report: Mutex<Value>,
    summary: Mutex<Value>,
    fail: Mutex<Option<String>>,
    delay_ms: AtomicU64,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessor {
    /// Create a new mock processor returning a plausible vector report.
    pub fn new() -> Self {
        Self {
            report: Mutex::new(json!({
                "assetType": "vector",
                "mbr": "POLYGON ((6.5206 49.4439, 6.5206 50.1845, 5.73398 50.1845, \
                        5.73398 49.4439, 6.5206 49.4439))",
                "crs": "EPSG:4326",
                "featureCount": 3,
                "attributes": ["name", "length"],
            })),
            summary: Mutex::new(json!({
                "samples": {"name": ["broadway"]},
                "histograms": {},
            })),
            fail: Mutex::new(None),
            delay_ms: AtomicU64::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replace the report returned by profile calls.
    pub fn set_report(&self, report: Value) {
        *self.report.lock().unwrap() = report;
    }

    /// Replace the summary returned by summarize calls.
    pub fn set_summary(&self, summary: Value) {
        *self.summary.lock().unwrap() = summary;
    }

    /// Make every following call fail with this message.
    pub fn fail_with(&self, message: &str) {
        *self.fail.lock().unwrap() = Some(message.to_string());
    }

    /// Simulated processing duration in milliseconds.
    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::Relaxed);
    }

    /// Get all recorded calls.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of processor invocations.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn enter(&self, operation: &str, input: &Path) -> Result<(), ProcessorError> {
        self.calls.lock().unwrap().push(RecordedCall {
            operation: operation.to_string(),
            input: input.to_path_buf(),
        });

        let delay = self.delay_ms.load(Ordering::Relaxed);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if let Some(message) = self.fail.lock().unwrap().clone() {
            return Err(ProcessorError::failed(message, None));
        }
        Ok(())
    }
}

#[async_trait]
impl Processor for MockProcessor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn profile(
        &self,
        input: &Path,
        _kind: ResourceKind,
        _params: &ProfileParams,
    ) -> Result<Value, ProcessorError> {
        self.enter("profile", input).await?;
        Ok(self.report.lock().unwrap().clone())
    }

    async fn normalize(
        &self,
        input: &Path,
        params: &NormalizeParams,
    ) -> Result<DatasetOutput, ProcessorError> {
        self.enter("normalize", input).await?;

        let base_name = normalized_base_name(input);
        let parent = input.parent().unwrap_or(Path::new("."));
        let path = match params.resource_type {
            ExportFormat::Csv => {
                let path = parent.join(format!("{}.csv", base_name));
                std::fs::write(&path, "id,name\n1,sample\n")?;
                path
            }
            ExportFormat::Shp => {
                let bundle = parent.join(&base_name);
                std::fs::create_dir_all(&bundle)?;
                for ext in ["shp", "shx", "dbf"] {
                    std::fs::write(bundle.join(format!("{}.{}", base_name, ext)), b"stub")?;
                }
                bundle
            }
        };

        Ok(DatasetOutput {
            path,
            format: params.resource_type,
            base_name,
        })
    }

    async fn summarize(
        &self,
        input: &Path,
        _params: &SummarizeParams,
    ) -> Result<Value, ProcessorError> {
        self.enter("summarize", input).await?;
        Ok(self.summary.lock().unwrap().clone())
    }

    async fn validate(&self) -> Result<(), ProcessorError> {
        Ok(())
    }
}
