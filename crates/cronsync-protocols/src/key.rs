//! Typed engine identities.
//!
//! Job and trigger keys share a shape but are distinct types so one can
//! never be passed where the other is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a registered job detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub name: String,
    pub group: String,
}

impl JobKey {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}

/// Identity of a cron trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerKey {
    pub name: String,
    pub group: String,
}

impl TriggerKey {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}

/// Identity of one quarantined refire attempt.
///
/// Lives in the engine's [`RetryKey::GROUP`] namespace while the job is in
/// backoff. The display form is for logs only and is never parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetryKey {
    pub job_id: String,
    pub attempt_index: u32,
}

impl RetryKey {
    /// Engine-side group holding quarantined refire attempts.
    pub const GROUP: &'static str = "FailingJobsGroup";

    pub fn new(job_id: impl Into<String>, attempt_index: u32) -> Self {
        Self {
            job_id: job_id.into(),
            attempt_index,
        }
    }
}

impl fmt::Display for RetryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}]", Self::GROUP, self.job_id, self.attempt_index)
    }
}
