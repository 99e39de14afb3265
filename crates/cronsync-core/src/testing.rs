//! In-memory scheduler engine for synchronizer tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use cronsync_protocols::{
    CronTrigger, EngineError, ExecutingJob, JobDetail, JobKey, RetryKey, SchedulerPort,
    TriggerInfo, TriggerKey,
};

#[derive(Default)]
struct FakeState {
    jobs: HashMap<JobKey, JobDetail>,
    triggers: HashMap<TriggerKey, CronTrigger>,
    retries: HashSet<RetryKey>,
    executing: Vec<ExecutingJob>,
    refuse_interrupt: HashSet<JobKey>,
    interrupted: Vec<JobKey>,
    fired: Vec<JobKey>,
    unavailable: bool,
}

/// Registry-only engine: records calls, never fires anything by itself.
#[derive(Default)]
pub(crate) struct FakeScheduler {
    state: Mutex<FakeState>,
}

impl FakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    pub fn add_retry(&self, key: RetryKey) {
        self.state.lock().retries.insert(key);
    }

    pub fn add_executing(&self, running: ExecutingJob) {
        self.state.lock().executing.push(running);
    }

    pub fn refuse_interrupt(&self, key: JobKey) {
        self.state.lock().refuse_interrupt.insert(key);
    }

    pub fn has_job(&self, key: &JobKey) -> bool {
        self.state.lock().jobs.contains_key(key)
    }

    pub fn trigger_expression(&self, key: &TriggerKey) -> Option<String> {
        self.state
            .lock()
            .triggers
            .get(key)
            .map(|t| t.expression().to_string())
    }

    pub fn retry_count(&self) -> usize {
        self.state.lock().retries.len()
    }

    pub fn fired(&self) -> Vec<JobKey> {
        self.state.lock().fired.clone()
    }

    pub fn interrupted(&self) -> Vec<JobKey> {
        self.state.lock().interrupted.clone()
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.state.lock().unavailable {
            return Err(EngineError::Unavailable("fake engine offline".to_string()));
        }
        Ok(())
    }

    fn first_fire(trigger: &CronTrigger) -> Result<DateTime<Utc>, EngineError> {
        trigger
            .next_fire_after(Utc::now())
            .ok_or_else(|| EngineError::WillNeverFire(trigger.key().to_string()))
    }
}

#[async_trait]
impl SchedulerPort for FakeScheduler {
    async fn check_job_exists(&self, key: &JobKey) -> Result<bool, EngineError> {
        self.check()?;
        Ok(self.state.lock().jobs.contains_key(key))
    }

    async fn check_trigger_exists(&self, key: &TriggerKey) -> Result<bool, EngineError> {
        self.check()?;
        Ok(self.state.lock().triggers.contains_key(key))
    }

    async fn get_trigger(&self, key: &TriggerKey) -> Result<Option<TriggerInfo>, EngineError> {
        self.check()?;
        Ok(self.state.lock().triggers.get(key).map(|t| TriggerInfo {
            key: t.key().clone(),
            job_key: t.job_key().clone(),
            cron_expression: t.expression().to_string(),
            misfire_policy: t.misfire_policy(),
            next_fire_time: t.next_fire_after(Utc::now()),
            previous_fire_time: None,
        }))
    }

    async fn schedule_job(
        &self,
        detail: JobDetail,
        trigger: CronTrigger,
    ) -> Result<DateTime<Utc>, EngineError> {
        self.check()?;
        let next = Self::first_fire(&trigger)?;
        let mut state = self.state.lock();
        if state.jobs.contains_key(&detail.key) {
            return Err(EngineError::AlreadyExists(detail.key.to_string()));
        }
        state.triggers.insert(trigger.key().clone(), trigger);
        state.jobs.insert(detail.key.clone(), detail);
        Ok(next)
    }

    async fn schedule_trigger(&self, trigger: CronTrigger) -> Result<DateTime<Utc>, EngineError> {
        self.check()?;
        let next = Self::first_fire(&trigger)?;
        let mut state = self.state.lock();
        if !state.jobs.contains_key(trigger.job_key()) {
            return Err(EngineError::JobNotFound(trigger.job_key().to_string()));
        }
        state.triggers.insert(trigger.key().clone(), trigger);
        Ok(next)
    }

    async fn reschedule_job(
        &self,
        key: &TriggerKey,
        trigger: CronTrigger,
    ) -> Result<Option<DateTime<Utc>>, EngineError> {
        self.check()?;
        let mut state = self.state.lock();
        if !state.triggers.contains_key(key) {
            return Ok(None);
        }
        let next = Self::first_fire(&trigger)?;
        state.triggers.insert(key.clone(), trigger);
        Ok(Some(next))
    }

    async fn unschedule_job(&self, key: &TriggerKey) -> Result<bool, EngineError> {
        self.check()?;
        let mut state = self.state.lock();
        match state.triggers.remove(key) {
            Some(trigger) => {
                let job_key = trigger.job_key();
                state.retries.retain(|retry| retry.job_id != job_key.name);
                state.jobs.remove(job_key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_job(&self, key: &JobKey) -> Result<bool, EngineError> {
        self.check()?;
        let mut state = self.state.lock();
        state.triggers.retain(|_, t| t.job_key() != key);
        state.retries.retain(|retry| retry.job_id != key.name);
        Ok(state.jobs.remove(key).is_some())
    }

    async fn trigger_job(&self, key: &JobKey) -> Result<(), EngineError> {
        self.check()?;
        let mut state = self.state.lock();
        if !state.jobs.contains_key(key) {
            return Err(EngineError::JobNotFound(key.to_string()));
        }
        state.fired.push(key.clone());
        Ok(())
    }

    async fn interrupt(&self, key: &JobKey) -> Result<bool, EngineError> {
        self.check()?;
        let mut state = self.state.lock();
        if state.refuse_interrupt.contains(key) {
            return Ok(false);
        }
        let running = state.executing.iter().any(|e| &e.job_key == key);
        if running {
            state.interrupted.push(key.clone());
        }
        Ok(running)
    }

    async fn currently_executing_jobs(&self) -> Result<Vec<ExecutingJob>, EngineError> {
        self.check()?;
        Ok(self.state.lock().executing.clone())
    }

    async fn check_retry_exists(&self, key: &RetryKey) -> Result<bool, EngineError> {
        self.check()?;
        Ok(self.state.lock().retries.contains(key))
    }

    async fn delete_retry(&self, key: &RetryKey) -> Result<bool, EngineError> {
        self.check()?;
        Ok(self.state.lock().retries.remove(key))
    }

    async fn retry_keys(&self) -> Result<Vec<RetryKey>, EngineError> {
        self.check()?;
        Ok(self.state.lock().retries.iter().cloned().collect())
    }
}
