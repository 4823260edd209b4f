//! Prometheus metrics for the job subsystem.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

/// Jobs accepted into the submission queue.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "geoprofile_jobs_submitted_total",
        "Total deferred jobs accepted into the queue",
    )
    .unwrap()
});

/// Jobs rejected because the submission queue was full.
pub static JOBS_REJECTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "geoprofile_jobs_rejected_total",
        "Total deferred jobs rejected at submission",
    )
    .unwrap()
});

/// Jobs that reached a terminal state, by result.
pub static JOBS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "geoprofile_jobs_completed_total",
            "Total jobs that reached a terminal state",
        ),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Job execution time in seconds, by namespace.
pub static JOB_EXECUTION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "geoprofile_job_execution_seconds",
            "Seconds between job acceptance and terminal update",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0, 1800.0]),
        &["namespace"], // "profile", "normalize", "summarize"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_REJECTED.clone()),
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(JOB_EXECUTION_SECONDS.clone()),
    ]
}
