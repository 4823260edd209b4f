//! CLI-backed processor implementation.
//!
//! Delegates the domain computation to an external profiler tool (the
//! BigDataVoyant command line interface, or any drop-in replacement) and
//! adapts its stdout into the processor seam types.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::config::ProcessorConfig;
use super::error::ProcessorError;
use super::traits::Processor;
use super::types::{normalized_base_name, DatasetOutput, ResourceKind};
use crate::params::{NormalizeParams, ProfileParams, SummarizeParams};

/// Processor delegating to an external profiler command.
///
/// Invocation shape: `bdv <operation> [kind] <input> --params <json>`.
/// Report operations print a JSON document on stdout; `normalize` prints
/// the path of the produced dataset (file for csv, bundle directory for
/// shp) as its last stdout line.
pub struct CliProcessor {
    config: ProcessorConfig,
}

impl CliProcessor {
    /// Creates a new CLI processor with the given configuration.
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Creates a processor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ProcessorConfig::default())
    }

    async fn run_command(&self, args: &[String]) -> Result<String, ProcessorError> {
        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.extra_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessorError::CommandNotFound {
                    path: self.config.command.clone(),
                }
            } else {
                ProcessorError::Io(e)
            }
        })?;

        let timeout_secs = self.config.timeout_secs;
        let output = timeout(
            Duration::from_secs(timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| ProcessorError::Timeout { timeout_secs })??;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let reason = stderr
                .lines()
                .last()
                .filter(|line| !line.is_empty())
                .unwrap_or("profiler exited with an error")
                .to_string();
            return Err(ProcessorError::failed(reason, Some(stderr)));
        }

        Ok(stdout)
    }

    fn params_json<T: serde::Serialize>(params: &T) -> Result<String, ProcessorError> {
        serde_json::to_string(params).map_err(|e| ProcessorError::ParseError {
            reason: format!("failed to encode parameters: {}", e),
        })
    }

    fn check_input(input: &Path) -> Result<(), ProcessorError> {
        if !input.exists() {
            return Err(ProcessorError::InputNotFound {
                path: input.to_path_buf(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Processor for CliProcessor {
    fn name(&self) -> &str {
        "cli"
    }

    async fn profile(
        &self,
        input: &Path,
        kind: ResourceKind,
        params: &ProfileParams,
    ) -> Result<Value, ProcessorError> {
        Self::check_input(input)?;
        let args = vec![
            "profile".to_string(),
            kind.as_str().to_string(),
            input.to_string_lossy().to_string(),
            "--params".to_string(),
            Self::params_json(params)?,
        ];
        let stdout = self.run_command(&args).await?;
        serde_json::from_str(&stdout).map_err(|e| ProcessorError::ParseError {
            reason: format!("profiler did not return valid JSON: {}", e),
        })
    }

    async fn normalize(
        &self,
        input: &Path,
        params: &NormalizeParams,
    ) -> Result<DatasetOutput, ProcessorError> {
        Self::check_input(input)?;
        let args = vec![
            "normalize".to_string(),
            input.to_string_lossy().to_string(),
            "--params".to_string(),
            Self::params_json(params)?,
        ];
        let stdout = self.run_command(&args).await?;

        let produced = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(str::trim)
            .ok_or_else(|| ProcessorError::ParseError {
                reason: "profiler did not report an output path".to_string(),
            })?;
        let path = PathBuf::from(produced);
        if !path.exists() {
            return Err(ProcessorError::ParseError {
                reason: format!("profiler reported a missing output path: {}", produced),
            });
        }

        Ok(DatasetOutput {
            path,
            format: params.resource_type,
            base_name: normalized_base_name(input),
        })
    }

    async fn summarize(
        &self,
        input: &Path,
        params: &SummarizeParams,
    ) -> Result<Value, ProcessorError> {
        Self::check_input(input)?;
        let args = vec![
            "summarize".to_string(),
            input.to_string_lossy().to_string(),
            "--params".to_string(),
            Self::params_json(params)?,
        ];
        let stdout = self.run_command(&args).await?;
        serde_json::from_str(&stdout).map_err(|e| ProcessorError::ParseError {
            reason: format!("profiler did not return valid JSON: {}", e),
        })
    }

    async fn validate(&self) -> Result<(), ProcessorError> {
        let mut command = Command::new(&self.config.command);
        command
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = command.status().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessorError::CommandNotFound {
                    path: self.config.command.clone(),
                }
            } else {
                ProcessorError::Io(e)
            }
        })?;

        if !status.success() {
            return Err(ProcessorError::failed(
                "profiler --version exited with an error",
                None,
            ));
        }
        Ok(())
    }
}
