//! Scheduler engine protocol definitions.
//!
//! The synchronizer never caches engine state: every reconciliation asks the
//! engine through [`SchedulerPort`] what is actually registered.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{EngineError, JobError};
use crate::job::JobDefinition;
use crate::key::{JobKey, RetryKey, TriggerKey};

/// What the engine does with a trigger whose fire time passed while it
/// could not fire (engine down, all workers busy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisfirePolicy {
    /// Fire once immediately, then continue on schedule.
    #[default]
    FireAndProceed,
    /// Skip the missed fire and wait for the next scheduled time.
    DoNothing,
}

/// A cron trigger bound to one job.
#[derive(Debug, Clone)]
pub struct CronTrigger {
    key: TriggerKey,
    job_key: JobKey,
    expression: String,
    schedule: Schedule,
    misfire_policy: MisfirePolicy,
}

impl CronTrigger {
    /// Parse `expression` into a trigger.
    pub fn new(
        key: TriggerKey,
        job_key: JobKey,
        expression: &str,
    ) -> Result<Self, EngineError> {
        let schedule = Schedule::from_str(expression.trim()).map_err(|e| {
            EngineError::InvalidCron {
                expression: expression.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            key,
            job_key,
            expression: expression.trim().to_string(),
            schedule,
            misfire_policy: MisfirePolicy::default(),
        })
    }

    /// Trigger for `job` using its stored cron expression.
    pub fn for_job(job: &JobDefinition) -> Result<Self, EngineError> {
        Self::for_job_with(job, &job.cron_expression)
    }

    /// Trigger for `job` using a replacement cron expression.
    pub fn for_job_with(job: &JobDefinition, expression: &str) -> Result<Self, EngineError> {
        Self::new(job.trigger_key(), job.job_key(), expression)
    }

    pub fn with_misfire_policy(mut self, policy: MisfirePolicy) -> Self {
        self.misfire_policy = policy;
        self
    }

    pub fn key(&self) -> &TriggerKey {
        &self.key
    }

    pub fn job_key(&self) -> &JobKey {
        &self.job_key
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn misfire_policy(&self) -> MisfirePolicy {
        self.misfire_policy
    }

    /// First fire time strictly after `after`, or `None` if the schedule is exhausted.
    pub fn next_fire_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }
}

/// Point-in-time view of a registered trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerInfo {
    pub key: TriggerKey,
    pub job_key: JobKey,
    pub cron_expression: String,
    pub misfire_policy: MisfirePolicy,
    pub next_fire_time: Option<DateTime<Utc>>,
    pub previous_fire_time: Option<DateTime<Utc>>,
}

/// A job registration: identity plus the job definition it was built from.
#[derive(Debug, Clone)]
pub struct JobDetail {
    pub key: JobKey,
    pub definition: JobDefinition,
}

impl JobDetail {
    pub fn for_job(job: &JobDefinition) -> Self {
        Self {
            key: job.job_key(),
            definition: job.clone(),
        }
    }
}

/// Per-firing state handed to a [`ScheduledJob`].
#[derive(Debug, Clone)]
pub struct FiringContext {
    pub fire_id: Uuid,
    pub job_key: JobKey,
    /// Job definition as registered; bodies re-read the store for fresh state.
    pub definition: JobDefinition,
    /// 0 on the first attempt, incremented for each engine refire.
    pub refire_index: u32,
    /// When the trigger was due; `None` for out-of-band fires.
    pub scheduled_fire_time: Option<DateTime<Utc>>,
    pub fire_time: DateTime<Utc>,
    /// Set by the execution wrapper before the body runs.
    pub execute_time: Option<DateTime<Utc>>,
    cancel: CancellationToken,
}

impl FiringContext {
    pub fn new(job_key: JobKey, definition: JobDefinition, fire_time: DateTime<Utc>) -> Self {
        Self {
            fire_id: Uuid::new_v4(),
            job_key,
            definition,
            refire_index: 0,
            scheduled_fire_time: None,
            fire_time,
            execute_time: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_refire_index(mut self, index: u32) -> Self {
        self.refire_index = index;
        self
    }

    pub fn with_scheduled_fire_time(mut self, time: DateTime<Utc>) -> Self {
        self.scheduled_fire_time = Some(time);
        self
    }

    /// Token cancelled when the engine interrupts this firing.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A firing currently in progress.
#[derive(Debug, Clone)]
pub struct ExecutingJob {
    pub fire_id: Uuid,
    pub job_key: JobKey,
    /// The job definition this firing originated from.
    pub definition: JobDefinition,
    pub refire_index: u32,
    pub fire_time: DateTime<Utc>,
}

/// One firing-ready job instance.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Run the job. Errors are handed to the engine's refire policy.
    async fn execute(&self, ctx: &mut FiringContext) -> Result<(), JobError>;

    /// Ask a running firing to stop at its next safe point.
    fn interrupt(&self) -> Result<(), JobError> {
        Err(JobError::NotInterruptible("job does not support interruption".to_string()))
    }
}

/// Builds job instances for registered job details.
pub trait JobFactory: Send + Sync {
    /// Whether jobs of `group` can be built.
    fn supports(&self, group: &str) -> bool;

    /// Build a fresh job instance for one firing.
    fn new_job(&self, detail: &JobDetail) -> Result<Arc<dyn ScheduledJob>, EngineError>;
}

/// Observer for engine-side retry events.
#[async_trait]
pub trait FiringListener: Send + Sync {
    /// A failed firing was quarantined and will refire at `refire_at`.
    async fn refire_scheduled(
        &self,
        key: &RetryKey,
        job: &JobDefinition,
        refire_at: DateTime<Utc>,
    );
}

/// The scheduler engine as consumed by the job-state synchronizer.
#[async_trait]
pub trait SchedulerPort: Send + Sync {
    async fn check_job_exists(&self, key: &JobKey) -> Result<bool, EngineError>;

    async fn check_trigger_exists(&self, key: &TriggerKey) -> Result<bool, EngineError>;

    async fn get_trigger(&self, key: &TriggerKey) -> Result<Option<TriggerInfo>, EngineError>;

    /// Register a job detail together with its trigger. Returns the first fire time.
    async fn schedule_job(
        &self,
        detail: JobDetail,
        trigger: CronTrigger,
    ) -> Result<DateTime<Utc>, EngineError>;

    /// Attach a trigger to an already registered job. Returns the first fire time.
    async fn schedule_trigger(&self, trigger: CronTrigger) -> Result<DateTime<Utc>, EngineError>;

    /// Replace the trigger at `key`. Returns `None` if no such trigger existed.
    async fn reschedule_job(
        &self,
        key: &TriggerKey,
        trigger: CronTrigger,
    ) -> Result<Option<DateTime<Utc>>, EngineError>;

    /// Remove a trigger. A job left without triggers is removed with it.
    async fn unschedule_job(&self, key: &TriggerKey) -> Result<bool, EngineError>;

    /// Remove a job and all of its triggers.
    async fn delete_job(&self, key: &JobKey) -> Result<bool, EngineError>;

    /// Fire a registered job now, out of band from its cron.
    async fn trigger_job(&self, key: &JobKey) -> Result<(), EngineError>;

    /// Interrupt every running firing of `key`. Returns whether any was signalled.
    async fn interrupt(&self, key: &JobKey) -> Result<bool, EngineError>;

    async fn currently_executing_jobs(&self) -> Result<Vec<ExecutingJob>, EngineError>;

    async fn check_retry_exists(&self, key: &RetryKey) -> Result<bool, EngineError>;

    /// Drop a quarantined refire attempt so it never fires.
    async fn delete_retry(&self, key: &RetryKey) -> Result<bool, EngineError>;

    /// All quarantined refire attempts.
    async fn retry_keys(&self) -> Result<Vec<RetryKey>, EngineError>;
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
