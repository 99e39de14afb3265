//! Configuration for the cron engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cron engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of firings running at once.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// How late a fire may be before it counts as a misfire.
    #[serde(default = "default_misfire_threshold_secs")]
    pub misfire_threshold_secs: u64,
}

fn default_max_concurrent_jobs() -> usize {
    10
}

fn default_misfire_threshold_secs() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            misfire_threshold_secs: default_misfire_threshold_secs(),
        }
    }
}

impl EngineConfig {
    pub fn new(max_concurrent_jobs: usize, misfire_threshold_secs: u64) -> Self {
        Self {
            max_concurrent_jobs,
            misfire_threshold_secs,
        }
    }

    pub fn misfire_threshold(&self) -> Duration {
        Duration::from_secs(self.misfire_threshold_secs)
    }

    /// Worker permits; never zero.
    pub(crate) fn permits(&self) -> usize {
        self.max_concurrent_jobs.max(1)
    }
}
