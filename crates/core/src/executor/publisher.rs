//! Publication of finished jobs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use super::types::JobOutcome;
use crate::exporter::store_dataset;
use crate::metrics;
use crate::processor::ProcessorOutput;
use crate::ticket::TicketStore;

/// Publishes job outcomes: materializes the artifact under the output root,
/// writes the ticket's terminal state, emits the accounting line and
/// removes the workspace.
///
/// Runs on the worker task with its own store handle, outside any HTTP
/// request context. The ordering is deliberate: the ticket must never point
/// at an artifact that does not exist yet, and the workspace must survive
/// until the artifact has been copied out of it.
pub struct ResultPublisher {
    store: Arc<dyn TicketStore>,
    output_root: PathBuf,
}

impl ResultPublisher {
    pub fn new(store: Arc<dyn TicketStore>, output_root: PathBuf) -> Self {
        Self { store, output_root }
    }

    /// Publish one job outcome. Called exactly once per submitted job.
    pub async fn publish(&self, outcome: JobOutcome) {
        let (success, result, comment) = match &outcome.output {
            Some(output) => match self.materialize(&outcome.ticket, output) {
                Ok(rel_path) => (true, Some(rel_path), None),
                Err(e) => {
                    error!(
                        "Failed to store result for ticket {}: {}",
                        outcome.ticket, e
                    );
                    (false, None, Some(format!("Failed to store result: {}", e)))
                }
            },
            None => (false, None, outcome.comment.clone()),
        };

        match self.store.mark_terminal(
            &outcome.ticket,
            success,
            result.as_deref(),
            comment.as_deref(),
        ) {
            Ok(update) => {
                info!(
                    target: "accounting",
                    ticket = %outcome.ticket,
                    success,
                    execution_start = %update.requested_time.format("%Y-%m-%d %H:%M:%S"),
                    execution_time = update.execution_time,
                    comment = comment.as_deref().unwrap_or("-"),
                    filesize = outcome.filesize,
                    "job finished"
                );
                metrics::JOBS_COMPLETED
                    .with_label_values(&[if success { "success" } else { "failed" }])
                    .inc();
                metrics::JOB_EXECUTION_SECONDS
                    .with_label_values(&[outcome.namespace])
                    .observe(update.execution_time);
            }
            Err(e) => {
                error!(
                    "Failed to record terminal state for ticket {}: {}",
                    outcome.ticket, e
                );
            }
        }

        if let Err(e) = tokio::fs::remove_dir_all(&outcome.workspace).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove workspace {:?} for ticket {}: {}",
                    outcome.workspace, outcome.ticket, e
                );
            }
        }

        info!(
            "Processing of ticket: {} is completed",
            outcome.ticket
        );
    }

    /// Write the artifact under `{output_root}/{yymmdd}/{ticket}/result.*`
    /// and return its path relative to the output root.
    fn materialize(
        &self,
        ticket: &str,
        output: &ProcessorOutput,
    ) -> Result<String, std::io::Error> {
        let rel_dir = Path::new(&Utc::now().format("%y%m%d").to_string()).join(ticket);
        let out_dir = self.output_root.join(&rel_dir);
        std::fs::create_dir_all(&out_dir)?;

        let file_name = match output {
            ProcessorOutput::Report(report) => {
                let target = out_dir.join("result.json");
                std::fs::write(&target, serde_json::to_vec(report)?)?;
                "result.json".to_string()
            }
            ProcessorOutput::Dataset(dataset) => {
                let stored = store_dataset(dataset, &out_dir, "result")
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
                stored
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "result".to_string())
            }
        };

        Ok(rel_dir.join(file_name).to_string_lossy().to_string())
    }
}
