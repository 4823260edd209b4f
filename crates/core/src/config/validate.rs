use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Storage section has a usable output directory (enforced by serde)
/// - Server port is not 0
/// - Executor pool has at least one worker
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.storage.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.output_dir cannot be empty".to_string(),
        ));
    }

    if config.executor.workers == 0 {
        return Err(ConfigError::ValidationError(
            "executor.workers must be at least 1".to_string(),
        ));
    }

    Ok(())
}
