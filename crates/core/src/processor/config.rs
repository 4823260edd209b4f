//! Configuration for the CLI-backed processor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the external profiler tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Path to the profiler binary.
    #[serde(default = "default_command")]
    pub command: PathBuf,

    /// Timeout for a single invocation in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Additional global arguments passed on every invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_command() -> PathBuf {
    PathBuf::from("bdv")
}

fn default_timeout() -> u64 {
    600
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            timeout_secs: default_timeout(),
            extra_args: Vec::new(),
        }
    }
}

impl ProcessorConfig {
    /// Creates a config with a custom profiler command.
    pub fn with_command(command: PathBuf) -> Self {
        Self {
            command,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
