//! Job state synchronizer.
//!
//! Brings scheduler engine registration into agreement with each job's
//! persisted status. Engine state is always re-read through the
//! [`SchedulerPort`]; nothing is cached between calls, so concurrent calls
//! for the same job resolve as last-reconciliation-wins.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use cronsync_protocols::{
    CronTrigger, EngineError, JobDefinition, JobDetail, JobResult, JobStatus, JobStore,
    MisfirePolicy, SchedulerPort,
};

use crate::error::SyncError;

/// Reconciles job definitions with the scheduler engine.
pub struct JobStateSynchronizer {
    scheduler: Arc<dyn SchedulerPort>,
    store: Arc<dyn JobStore>,
}

impl JobStateSynchronizer {
    pub fn new(scheduler: Arc<dyn SchedulerPort>, store: Arc<dyn JobStore>) -> Self {
        Self { scheduler, store }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn scheduler(&self) -> &Arc<dyn SchedulerPort> {
        &self.scheduler
    }

    /// Reconcile each job with the engine and persist it.
    ///
    /// Jobs are reconciled concurrently. A failure is logged and affects only
    /// its own job; every job is saved whether or not its engine calls
    /// succeeded. Returns the jobs as persisted.
    pub async fn dispatch(&self, jobs: Vec<JobDefinition>) -> Vec<JobDefinition> {
        join_all(jobs.into_iter().map(|job| self.dispatch_one(job))).await
    }

    /// Reconcile the jobs of `group` whose IDs are in `job_ids` (all when empty).
    pub async fn dispatch_group(
        &self,
        group: &str,
        job_ids: &[String],
    ) -> Result<Vec<JobDefinition>, SyncError> {
        let jobs: Vec<JobDefinition> = self
            .store
            .find_by_job_group(group)
            .await?
            .into_iter()
            .filter(|job| job_ids.is_empty() || job_ids.contains(&job.job_id))
            .collect();

        info!("Dispatching {} job(s) of group '{}'", jobs.len(), group);
        Ok(self.dispatch(jobs).await)
    }

    async fn dispatch_one(&self, mut job: JobDefinition) -> JobDefinition {
        if let Err(e) = self.reconcile(&mut job).await {
            error!("Failed to dispatch job '{}': {}", job.job_id, e);
        }
        if let Err(e) = self.store.save(&job).await {
            error!("Failed to save job '{}' after dispatch: {}", job.job_id, e);
        }
        job
    }

    async fn reconcile(&self, job: &mut JobDefinition) -> Result<(), SyncError> {
        let registered = self.scheduler.check_job_exists(&job.job_key()).await?;

        match (registered, job.status) {
            (true, JobStatus::Disabled) => {
                self.remove_job_for(job).await?;
                job.next_fire_time = None;
                job.last_result = JobResult::Awaiting;
                info!("Job '{}' disabled, removed from scheduler", job.job_id);
            }
            (false, JobStatus::Enabled) => {
                let next = self.refresh_job(job, true).await?;
                job.next_fire_time = Some(next);
                info!("Job '{}' scheduled, next fire at {}", job.job_id, next);
            }
            _ => debug!("Job '{}' already in sync", job.job_id),
        }
        Ok(())
    }

    /// Fire a job immediately, out of band from its cron.
    ///
    /// Clears quarantined refire attempts first. When the job is not
    /// registered it is enabled (and registered) if `create_if_missing`,
    /// otherwise nothing is fired. Returns whether a fire was requested.
    pub async fn trigger_now(&self, job_id: &str, create_if_missing: bool) -> Result<bool, SyncError> {
        let Some(mut job) = self.store.find_by_job_id(job_id).await? else {
            debug!("trigger_now: unknown job '{}'", job_id);
            return Ok(false);
        };

        self.remove_failing_retry_jobs_for(&mut job).await?;

        let job_key = job.job_key();
        if !self.scheduler.check_job_exists(&job_key).await? {
            if !create_if_missing {
                warn!("Job '{}' is not scheduled, not triggering", job_id);
                return Ok(false);
            }
            self.update_status(job_id, Some(JobStatus::Enabled)).await?;
        }

        self.scheduler.trigger_job(&job_key).await?;
        info!("Job '{}' triggered", job_id);
        Ok(true)
    }

    /// Interrupt running firings of the given jobs.
    ///
    /// Each interrupted job is reset to [`JobResult::Awaiting`]. A job whose
    /// interrupt is refused is not tried again in this call. Returns whether
    /// at least one interrupt succeeded.
    pub async fn stop_now(&self, job_ids: &[String]) -> Result<bool, SyncError> {
        let mut pending: HashSet<&str> = job_ids.iter().map(String::as_str).collect();
        let mut interrupted = 0usize;

        for running in self.scheduler.currently_executing_jobs().await? {
            let job_id = running.definition.job_id.as_str();
            if !pending.contains(job_id) {
                continue;
            }

            if !self.scheduler.interrupt(&running.job_key).await? {
                warn!("Job '{}' refused interrupt", job_id);
                pending.remove(job_id);
                continue;
            }

            interrupted += 1;
            info!("Job '{}' interrupted (fire {})", job_id, running.fire_id);
            if let Some(mut job) = self.store.find_by_job_id(job_id).await? {
                job.last_result = JobResult::Awaiting;
                self.store.save(&job).await?;
            }
        }

        Ok(interrupted > 0)
    }

    /// Change a job's cron expression.
    ///
    /// The trigger is rescheduled in place, or created when missing. A
    /// disabled job keeps the new cron but its trigger is removed again
    /// immediately. Returns the computed next fire time; `None` for an
    /// unknown job or an unparsable expression.
    pub async fn update_cron(
        &self,
        job_id: &str,
        cron_expression: &str,
    ) -> Result<Option<DateTime<Utc>>, SyncError> {
        let Some(mut job) = self.store.find_by_job_id(job_id).await? else {
            debug!("update_cron: unknown job '{}'", job_id);
            return Ok(None);
        };

        let trigger = match CronTrigger::for_job_with(&job, cron_expression) {
            Ok(trigger) => trigger.with_misfire_policy(MisfirePolicy::FireAndProceed),
            Err(e) => {
                error!("Job '{}': {}", job_id, e);
                return Ok(None);
            }
        };

        let trigger_key = job.trigger_key();
        let next = if self.scheduler.check_trigger_exists(&trigger_key).await? {
            self.scheduler.reschedule_job(&trigger_key, trigger).await?
        } else if self.scheduler.check_job_exists(&job.job_key()).await? {
            Some(self.scheduler.schedule_trigger(trigger).await?)
        } else {
            let mut detail = JobDetail::for_job(&job);
            detail.definition.cron_expression = cron_expression.trim().to_string();
            Some(self.scheduler.schedule_job(detail, trigger).await?)
        };

        if !job.status.is_enabled() {
            self.scheduler.unschedule_job(&trigger_key).await?;
        }

        if let Some(next) = next {
            job.cron_expression = cron_expression.trim().to_string();
            job.next_fire_time = job.status.is_enabled().then_some(next);
            self.store.save(&job).await?;
            info!(
                "Job '{}' cron updated to '{}', next fire at {}",
                job_id, job.cron_expression, next
            );
        }

        Ok(next)
    }

    /// Enable, disable, or toggle (when `status` is `None`) a job.
    ///
    /// Returns the next fire time when the job ends up enabled.
    pub async fn update_status(
        &self,
        job_id: &str,
        status: Option<JobStatus>,
    ) -> Result<Option<DateTime<Utc>>, SyncError> {
        let Some(mut job) = self.store.find_by_job_id(job_id).await? else {
            debug!("update_status: unknown job '{}'", job_id);
            return Ok(None);
        };

        job.status = status.unwrap_or_else(|| job.status.toggle());

        let next = match job.status {
            JobStatus::Disabled => {
                self.remove_job_for(&mut job).await?;
                job.last_result = JobResult::Awaiting;
                None
            }
            JobStatus::Enabled => Some(self.refresh_job(&job, true).await?),
        };

        job.next_fire_time = next;
        self.store.save(&job).await?;
        info!("Job '{}' status set to {:?}", job_id, job.status);
        Ok(next)
    }

    /// Register or reschedule a job's trigger from its stored cron.
    ///
    /// Fails with [`EngineError::TriggerNotFound`] when there is no trigger
    /// and `create_if_no_trigger` is false.
    pub async fn refresh_job(
        &self,
        job: &JobDefinition,
        create_if_no_trigger: bool,
    ) -> Result<DateTime<Utc>, SyncError> {
        let trigger = CronTrigger::for_job(job)?.with_misfire_policy(MisfirePolicy::FireAndProceed);
        let trigger_key = job.trigger_key();

        if self.scheduler.check_trigger_exists(&trigger_key).await? {
            let next = self.scheduler.reschedule_job(&trigger_key, trigger).await?;
            return next.ok_or_else(|| EngineError::TriggerNotFound(trigger_key.to_string()).into());
        }

        if !create_if_no_trigger {
            return Err(EngineError::TriggerNotFound(trigger_key.to_string()).into());
        }

        let next = if self.scheduler.check_job_exists(&job.job_key()).await? {
            self.scheduler.schedule_trigger(trigger).await?
        } else {
            self.scheduler.schedule_job(JobDetail::for_job(job), trigger).await?
        };
        Ok(next)
    }

    /// [`Self::refresh_job`] by ID. `None` for an unknown job.
    pub async fn refresh_job_by_id(
        &self,
        job_id: &str,
        create_if_no_trigger: bool,
    ) -> Result<Option<DateTime<Utc>>, SyncError> {
        match self.store.find_by_job_id(job_id).await? {
            Some(job) => Ok(Some(self.refresh_job(&job, create_if_no_trigger).await?)),
            None => Ok(None),
        }
    }

    /// Drop every quarantined refire attempt of a job. Returns how many were removed.
    pub async fn remove_failing_retry_jobs(&self, job_id: &str) -> Result<usize, SyncError> {
        match self.store.find_by_job_id(job_id).await? {
            Some(mut job) => self.remove_failing_retry_jobs_for(&mut job).await,
            None => Ok(0),
        }
    }

    /// Drop every quarantined refire attempt of `job`, resetting it to
    /// [`JobResult::Awaiting`] and saving it when anything was removed.
    ///
    /// Keys come from the engine rather than the job's current
    /// `refire_max_count`, which may have been lowered since they were parked.
    pub async fn remove_failing_retry_jobs_for(
        &self,
        job: &mut JobDefinition,
    ) -> Result<usize, SyncError> {
        let parked = self
            .scheduler
            .retry_keys()
            .await?
            .into_iter()
            .filter(|key| key.job_id == job.job_id);

        let mut removed = 0;
        for key in parked {
            if self.scheduler.check_retry_exists(&key).await?
                && self.scheduler.delete_retry(&key).await?
            {
                debug!("Removed quarantined attempt {}", key);
                removed += 1;
            }
        }

        if removed > 0 {
            job.last_result = JobResult::Awaiting;
            self.store.save(job).await?;
            info!("Job '{}': removed {} failing retry attempt(s)", job.job_id, removed);
        }
        Ok(removed)
    }

    /// Unregister a job from the engine. The stored definition is kept.
    pub async fn remove_job(&self, job_id: &str) -> Result<bool, SyncError> {
        match self.store.find_by_job_id(job_id).await? {
            Some(mut job) => self.remove_job_for(&mut job).await,
            None => Ok(false),
        }
    }

    /// Purge quarantined attempts, then unschedule and delete the job.
    /// Returns whether any engine registration was removed.
    pub async fn remove_job_for(&self, job: &mut JobDefinition) -> Result<bool, SyncError> {
        self.remove_failing_retry_jobs_for(job).await?;

        let trigger_key = job.trigger_key();
        let unscheduled = if self.scheduler.check_trigger_exists(&trigger_key).await? {
            self.scheduler.unschedule_job(&trigger_key).await?
        } else {
            false
        };
        let deleted = self.scheduler.delete_job(&job.job_key()).await?;

        if unscheduled || deleted {
            info!("Job '{}' removed from scheduler", job.job_id);
        }
        Ok(unscheduled || deleted)
    }

    /// Whether the engine has `job` registered. Engine errors read as `false`.
    pub async fn is_job_present(&self, job: &JobDefinition) -> bool {
        match self.scheduler.check_job_exists(&job.job_key()).await {
            Ok(present) => present,
            Err(e) => {
                warn!("Failed to check job '{}': {}", job.job_id, e);
                false
            }
        }
    }

    /// Whether the engine has a trigger for `job`. Engine errors read as `false`.
    pub async fn is_trigger_present(&self, job: &JobDefinition) -> bool {
        match self.scheduler.check_trigger_exists(&job.trigger_key()).await {
            Ok(present) => present,
            Err(e) => {
                warn!("Failed to check trigger of job '{}': {}", job.job_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "synchronizer_tests.rs"]
mod tests;
