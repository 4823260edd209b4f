//! Configuration for the job executor.

use serde::{Deserialize, Serialize};

/// Configuration for the background worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Number of jobs executing concurrently.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of the submission queue; submissions beyond it are rejected
    /// rather than blocking the request task.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

fn default_workers() -> usize {
    4
}

fn default_queue_size() -> usize {
    64
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_size: default_queue_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.queue_size, 64);
    }
}
