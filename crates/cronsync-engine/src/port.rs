//! [`SchedulerPort`] implementation for [`CronEngine`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use cronsync_protocols::{
    CronTrigger, EngineError, ExecutingJob, JobDetail, JobKey, RetryKey, SchedulerPort,
    TriggerInfo, TriggerKey,
};

use crate::engine::CronEngine;
use crate::registry::TriggerEntry;

impl CronEngine {
    fn first_fire(trigger: &CronTrigger) -> Result<DateTime<Utc>, EngineError> {
        trigger
            .next_fire_after(Utc::now())
            .ok_or_else(|| EngineError::WillNeverFire(trigger.key().to_string()))
    }
}

#[async_trait]
impl SchedulerPort for CronEngine {
    async fn check_job_exists(&self, key: &JobKey) -> Result<bool, EngineError> {
        Ok(self.inner.registry.read().jobs.contains_key(key))
    }

    async fn check_trigger_exists(&self, key: &TriggerKey) -> Result<bool, EngineError> {
        Ok(self.inner.registry.read().triggers.contains_key(key))
    }

    async fn get_trigger(&self, key: &TriggerKey) -> Result<Option<TriggerInfo>, EngineError> {
        Ok(self.inner.registry.read().triggers.get(key).map(TriggerEntry::info))
    }

    async fn schedule_job(
        &self,
        detail: JobDetail,
        trigger: CronTrigger,
    ) -> Result<DateTime<Utc>, EngineError> {
        self.ensure_running()?;
        if !self.inner.factory.supports(&detail.key.group) {
            return Err(EngineError::UnsupportedGroup(detail.key.group.clone()));
        }
        let next = Self::first_fire(&trigger)?;

        {
            let mut registry = self.inner.registry.write();
            if registry.jobs.contains_key(&detail.key) {
                return Err(EngineError::AlreadyExists(detail.key.to_string()));
            }
            if registry.triggers.contains_key(trigger.key()) {
                return Err(EngineError::AlreadyExists(trigger.key().to_string()));
            }
            registry
                .triggers
                .insert(trigger.key().clone(), TriggerEntry::new(trigger, next));
            info!("Scheduled job {}, first fire at {}", detail.key, next);
            registry.jobs.insert(detail.key.clone(), detail);
        }
        self.wake();
        Ok(next)
    }

    async fn schedule_trigger(&self, trigger: CronTrigger) -> Result<DateTime<Utc>, EngineError> {
        self.ensure_running()?;
        let next = Self::first_fire(&trigger)?;

        {
            let mut registry = self.inner.registry.write();
            if !registry.jobs.contains_key(trigger.job_key()) {
                return Err(EngineError::JobNotFound(trigger.job_key().to_string()));
            }
            if registry.triggers.contains_key(trigger.key()) {
                return Err(EngineError::AlreadyExists(trigger.key().to_string()));
            }
            debug!("Scheduled trigger {}, first fire at {}", trigger.key(), next);
            registry
                .triggers
                .insert(trigger.key().clone(), TriggerEntry::new(trigger, next));
        }
        self.wake();
        Ok(next)
    }

    async fn reschedule_job(
        &self,
        key: &TriggerKey,
        trigger: CronTrigger,
    ) -> Result<Option<DateTime<Utc>>, EngineError> {
        self.ensure_running()?;
        let next = Self::first_fire(&trigger)?;

        {
            let mut registry = self.inner.registry.write();
            let Some(previous) = registry.triggers.remove(key) else {
                return Ok(None);
            };
            let mut entry = TriggerEntry::new(trigger, next);
            entry.previous_fire_time = previous.previous_fire_time;
            info!("Rescheduled trigger {} to '{}', next fire at {}", key, entry.trigger.expression(), next);
            registry.triggers.insert(entry.trigger.key().clone(), entry);
        }
        self.wake();
        Ok(Some(next))
    }

    async fn unschedule_job(&self, key: &TriggerKey) -> Result<bool, EngineError> {
        let mut registry = self.inner.registry.write();
        let Some(entry) = registry.triggers.remove(key) else {
            return Ok(false);
        };

        let job_key = entry.trigger.job_key();
        let orphaned = !registry
            .triggers
            .values()
            .any(|other| other.trigger.job_key() == job_key);
        if orphaned {
            registry.remove_job(job_key);
        }
        info!("Unscheduled trigger {}", key);
        Ok(true)
    }

    async fn delete_job(&self, key: &JobKey) -> Result<bool, EngineError> {
        let deleted = self.inner.registry.write().remove_job(key);
        if deleted {
            info!("Deleted job {}", key);
        }
        Ok(deleted)
    }

    async fn trigger_job(&self, key: &JobKey) -> Result<(), EngineError> {
        self.ensure_running()?;
        {
            let mut registry = self.inner.registry.write();
            let detail = registry
                .jobs
                .get(key)
                .cloned()
                .ok_or_else(|| EngineError::JobNotFound(key.to_string()))?;
            registry.manual.push_back(detail);
        }
        debug!("Queued immediate fire of {}", key);
        self.wake();
        Ok(())
    }

    async fn interrupt(&self, key: &JobKey) -> Result<bool, EngineError> {
        let running: Vec<_> = self
            .inner
            .registry
            .read()
            .running_for(key)
            .map(|r| (r.info.fire_id, r.job.clone()))
            .collect();

        let mut interrupted = false;
        for (fire_id, job) in running {
            match job.interrupt() {
                Ok(()) => {
                    info!("Interrupted firing {} of {}", fire_id, key);
                    interrupted = true;
                }
                Err(e) => warn!("Unable to interrupt firing {} of {}: {}", fire_id, key, e),
            }
        }
        Ok(interrupted)
    }

    async fn currently_executing_jobs(&self) -> Result<Vec<ExecutingJob>, EngineError> {
        Ok(self
            .inner
            .registry
            .read()
            .executing
            .values()
            .map(|r| r.info.clone())
            .collect())
    }

    async fn check_retry_exists(&self, key: &RetryKey) -> Result<bool, EngineError> {
        Ok(self.inner.registry.read().retries.contains_key(key))
    }

    async fn delete_retry(&self, key: &RetryKey) -> Result<bool, EngineError> {
        Ok(self.inner.registry.write().retries.remove(key).is_some())
    }

    async fn retry_keys(&self) -> Result<Vec<RetryKey>, EngineError> {
        Ok(self.inner.registry.read().retries.keys().cloned().collect())
    }
}
