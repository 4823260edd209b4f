//! The bounded worker pool.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info};

use super::config::ExecutorConfig;
use super::publisher::ResultPublisher;
use super::types::{Job, JobOutcome};
use crate::metrics;
use crate::processor::Processor;

/// Handle for submitting jobs. Cheaply cloneable; shared across request
/// tasks.
#[derive(Clone)]
pub struct JobExecutor {
    tx: mpsc::Sender<Job>,
}

impl JobExecutor {
    /// Enqueue a job without blocking.
    ///
    /// Returns false when the submission queue is full or the runner has
    /// shut down; the caller is expected to surface that as a server-side
    /// error rather than retrying.
    pub fn submit(&self, job: Job) -> bool {
        let ticket = job.ticket.clone();
        match self.tx.try_send(job) {
            Ok(()) => {
                metrics::JOBS_SUBMITTED.inc();
                true
            }
            Err(e) => {
                metrics::JOBS_REJECTED.inc();
                error!("Failed to enqueue job for ticket {}: {}", ticket, e);
                false
            }
        }
    }
}

/// Background task draining the submission queue.
///
/// Jobs are started in FIFO order; at most `workers` run concurrently.
pub struct JobRunner {
    rx: mpsc::Receiver<Job>,
    workers: Arc<Semaphore>,
    processor: Arc<dyn Processor>,
    publisher: Arc<ResultPublisher>,
}

impl JobRunner {
    /// Run the pool, consuming jobs until every `JobExecutor` handle is
    /// dropped. Spawn this with `tokio::spawn(runner.run())`.
    pub async fn run(mut self) {
        info!("Job runner started");

        while let Some(job) = self.rx.recv().await {
            let permit = match Arc::clone(&self.workers).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let processor = Arc::clone(&self.processor);
            let publisher = Arc::clone(&self.publisher);

            tokio::spawn(async move {
                let outcome = execute_job(processor.as_ref(), job).await;
                publisher.publish(outcome).await;
                drop(permit);
            });
        }

        info!("Job runner shutting down");
    }
}

/// Run the processor once for a job, capturing any failure into the
/// outcome. A failing invocation never propagates out of the worker.
async fn execute_job(processor: &dyn Processor, job: Job) -> JobOutcome {
    info!("Starting processing ticket: {}", job.ticket);
    let namespace = job.invocation.namespace();

    match job.invocation.run(processor, &job.input).await {
        Ok(output) => JobOutcome {
            ticket: job.ticket,
            namespace,
            workspace: job.workspace,
            filesize: job.filesize,
            output: Some(output),
            comment: None,
        },
        Err(e) => {
            error!("Processing of ticket {} failed: {}", job.ticket, e);
            JobOutcome {
                ticket: job.ticket,
                namespace,
                workspace: job.workspace,
                filesize: job.filesize,
                output: None,
                comment: Some(e.to_string()),
            }
        }
    }
}

/// Create the executor handle and its runner.
pub fn create_executor(
    config: &ExecutorConfig,
    processor: Arc<dyn Processor>,
    publisher: Arc<ResultPublisher>,
) -> (JobExecutor, JobRunner) {
    let (tx, rx) = mpsc::channel(config.queue_size.max(1));
    let executor = JobExecutor { tx };
    let runner = JobRunner {
        rx,
        workers: Arc::new(Semaphore::new(config.workers.max(1))),
        processor,
        publisher,
    };
    (executor, runner)
}
