use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::executor::ExecutorConfig;
use crate::processor::ProcessorConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted upload size in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_mb() -> usize {
    1024
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("geoprofile.db")
}

/// Filesystem layout: where results, scratch space and path-based inputs live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for published job results. Required.
    pub output_dir: PathBuf,
    /// Root directory for per-ticket scratch workspaces.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// Root directory resolved against `resource` on the path-based endpoints.
    #[serde(default)]
    pub input_dir: PathBuf,
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Cross-origin configuration. Absent means CORS headers are not emitted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins; a single "*" allows any origin.
    pub origins: Vec<String>,
}
