//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

mod schema_expression;
mod schema_scheduler;

pub use schema_expression::*;
pub use schema_scheduler::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub http_client: HttpClientConfig,

    #[serde(default)]
    pub expression: ExpressionConfig,

    #[serde(default)]
    pub rewrite: RewriteConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Admin API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Job definition store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend: "sqlite" or "memory".
    #[serde(default = "default_backend")]
    pub backend: String,

    /// SQLite database file. Defaults to `~/.cronsync/jobs.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
        }
    }
}

/// Parsed form of [`StoreConfig::backend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl StoreConfig {
    /// Configured database path, or the default under the home directory.
    pub fn database_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_database_path)
    }

    pub fn backend_kind(&self) -> Result<StoreBackend, ConfigError> {
        match self.backend.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidValue {
                field: "store.backend".to_string(),
                message: format!("unknown backend '{}', expected sqlite or memory", other),
            }),
        }
    }
}

fn default_backend() -> String {
    "sqlite".to_string()
}

fn default_database_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cronsync")
        .join("jobs.db")
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rotated log files. Defaults to `~/.cronsync/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Rotated files to keep.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
            file_prefix: default_file_prefix(),
            max_files: default_max_files(),
        }
    }
}

impl LoggingConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cronsync")
                .join("logs")
        })
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "cronsync".to_string()
}

fn default_max_files() -> usize {
    30
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
