//! Scheduler engine and outbound HTTP client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum firings running at once.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// A trigger later than this is treated as misfired.
    #[serde(default = "default_misfire_threshold_secs")]
    pub misfire_threshold_secs: u64,

    /// Job groups reconciled once the engine starts.
    #[serde(default = "default_startup_groups")]
    pub startup_groups: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            misfire_threshold_secs: default_misfire_threshold_secs(),
            startup_groups: default_startup_groups(),
        }
    }
}

impl SchedulerConfig {
    pub fn misfire_threshold(&self) -> Duration {
        Duration::from_secs(self.misfire_threshold_secs)
    }
}

fn default_max_concurrent_jobs() -> usize {
    10
}

fn default_misfire_threshold_secs() -> u64 {
    60
}

fn default_startup_groups() -> Vec<String> {
    vec!["API-Trigger-Group".to_string()]
}

/// Timeouts for the HTTP client used by API-trigger jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

impl HttpClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_read_timeout_secs() -> u64 {
    15 * 60
}
