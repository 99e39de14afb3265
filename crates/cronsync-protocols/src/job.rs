//! Job definition and its status enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::key::{JobKey, RetryKey, TriggerKey};

/// Desired enablement of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job is recorded but must not be registered with the engine.
    #[default]
    Disabled,
    /// Job must be registered with the engine.
    Enabled,
}

impl JobStatus {
    /// Persisted integer code.
    pub fn code(self) -> i32 {
        match self {
            JobStatus::Disabled => 0,
            JobStatus::Enabled => 1,
        }
    }

    /// Decode a persisted code. Unknown codes map to [`JobStatus::Disabled`].
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => JobStatus::Enabled,
            _ => JobStatus::Disabled,
        }
    }

    /// The opposite status.
    pub fn toggle(self) -> Self {
        match self {
            JobStatus::Disabled => JobStatus::Enabled,
            JobStatus::Enabled => JobStatus::Disabled,
        }
    }

    pub fn is_enabled(self) -> bool {
        self == JobStatus::Enabled
    }
}

/// Outcome of the most recent firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobResult {
    #[default]
    Awaiting,
    Success,
    Executing,
    Fail,
    /// The engine is holding a refire attempt in its quarantine group.
    PendingRetry,
}

impl JobResult {
    /// Persisted integer code.
    pub fn code(self) -> i32 {
        match self {
            JobResult::Awaiting => 0,
            JobResult::Success => 1,
            JobResult::Executing => 2,
            JobResult::Fail => 3,
            JobResult::PendingRetry => 4,
        }
    }

    /// Decode a persisted code. Unknown codes map to [`JobResult::Awaiting`].
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => JobResult::Success,
            2 => JobResult::Executing,
            3 => JobResult::Fail,
            4 => JobResult::PendingRetry,
            _ => JobResult::Awaiting,
        }
    }
}

/// Known job groups. The group decides which job body runs a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobGroup {
    Etl,
    SqlCaller,
    ShellCaller,
    ApiTrigger,
}

impl JobGroup {
    pub const ALL: [JobGroup; 4] = [
        JobGroup::Etl,
        JobGroup::SqlCaller,
        JobGroup::ShellCaller,
        JobGroup::ApiTrigger,
    ];

    /// The group name stored on job definitions.
    pub fn name(self) -> &'static str {
        match self {
            JobGroup::Etl => "ETL-Group",
            JobGroup::SqlCaller => "SQL-Caller-Group",
            JobGroup::ShellCaller => "Shell-Caller-Group",
            JobGroup::ApiTrigger => "API-Trigger-Group",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.name() == name)
    }
}

impl fmt::Display for JobGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_refire_interval() -> u64 {
    60
}

/// Persisted description of one schedulable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Unique, externally assigned job ID.
    pub job_id: String,
    pub job_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_desc: Option<String>,
    /// Selects the job body bound to this job.
    pub job_group: String,
    /// Payload interpreted only by the bound job body (e.g. a URL template).
    #[serde(default)]
    pub job_strategy: String,
    #[serde(default)]
    pub status: JobStatus,
    pub cron_expression: String,
    #[serde(default)]
    pub last_fire_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_complete_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_result: JobResult,
    #[serde(default)]
    pub next_fire_time: Option<DateTime<Utc>>,
    /// Upper bound on engine refire attempts after a failed firing.
    #[serde(default)]
    pub refire_max_count: u32,
    /// Seconds between engine refire attempts.
    #[serde(default = "default_refire_interval")]
    pub refire_interval: u64,
    /// Consecutive failed runs, reset on success.
    #[serde(default)]
    pub error_accumulation: u32,
}

impl JobDefinition {
    /// Create a new, disabled job definition.
    pub fn new(
        job_id: impl Into<String>,
        job_name: impl Into<String>,
        job_group: impl Into<String>,
        cron_expression: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            job_name: job_name.into(),
            job_desc: None,
            job_group: job_group.into(),
            job_strategy: String::new(),
            status: JobStatus::Disabled,
            cron_expression: cron_expression.into(),
            last_fire_time: None,
            last_complete_time: None,
            last_result: JobResult::Awaiting,
            next_fire_time: None,
            refire_max_count: 0,
            refire_interval: default_refire_interval(),
            error_accumulation: 0,
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.job_strategy = strategy.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.job_desc = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the refire policy: at most `max_count` attempts, `interval_secs` apart.
    pub fn with_refire(mut self, max_count: u32, interval_secs: u64) -> Self {
        self.refire_max_count = max_count;
        self.refire_interval = interval_secs;
        self
    }

    pub fn job_key(&self) -> JobKey {
        JobKey::new(&self.job_id, &self.job_group)
    }

    pub fn trigger_key(&self) -> TriggerKey {
        TriggerKey::new(&self.job_id, &self.job_group)
    }

    /// Every quarantine key this job can occupy, one per refire attempt index.
    pub fn retry_keys(&self) -> impl Iterator<Item = RetryKey> + '_ {
        (0..self.refire_max_count).map(|index| RetryKey::new(&self.job_id, index))
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
