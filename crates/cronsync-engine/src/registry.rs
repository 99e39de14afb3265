//! Engine registry: jobs, triggers, quarantined refires and running firings.
//!
//! Plain data guarded by the engine's lock. Nothing here awaits.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use cronsync_protocols::{
    CronTrigger, ExecutingJob, JobDetail, JobKey, MisfirePolicy, RetryKey, ScheduledJob,
    TriggerInfo, TriggerKey,
};

/// A registered trigger and its fire-time bookkeeping.
pub(crate) struct TriggerEntry {
    pub trigger: CronTrigger,
    pub next_fire_time: Option<DateTime<Utc>>,
    pub previous_fire_time: Option<DateTime<Utc>>,
}

impl TriggerEntry {
    pub fn new(trigger: CronTrigger, next_fire_time: DateTime<Utc>) -> Self {
        Self {
            trigger,
            next_fire_time: Some(next_fire_time),
            previous_fire_time: None,
        }
    }

    pub fn info(&self) -> TriggerInfo {
        TriggerInfo {
            key: self.trigger.key().clone(),
            job_key: self.trigger.job_key().clone(),
            cron_expression: self.trigger.expression().to_string(),
            misfire_policy: self.trigger.misfire_policy(),
            next_fire_time: self.next_fire_time,
            previous_fire_time: self.previous_fire_time,
        }
    }
}

/// A failed firing waiting to be re-attempted.
pub(crate) struct RetryEntry {
    pub due: DateTime<Utc>,
    pub detail: JobDetail,
}

/// A firing in progress.
pub(crate) struct Running {
    pub info: ExecutingJob,
    pub job: Arc<dyn ScheduledJob>,
}

/// One firing to start.
#[derive(Debug, Clone)]
pub(crate) struct DueFiring {
    pub detail: JobDetail,
    pub refire_index: u32,
    pub scheduled_fire_time: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub(crate) struct Registry {
    pub jobs: HashMap<JobKey, JobDetail>,
    pub triggers: HashMap<TriggerKey, TriggerEntry>,
    pub retries: HashMap<RetryKey, RetryEntry>,
    pub executing: HashMap<Uuid, Running>,
    pub manual: VecDeque<JobDetail>,
}

impl Registry {
    /// Collect everything due at `now` and advance the triggers involved.
    ///
    /// A trigger late by more than `misfire_threshold` fires once under
    /// [`MisfirePolicy::FireAndProceed`] and is skipped under
    /// [`MisfirePolicy::DoNothing`]; either way it then resumes from `now`.
    pub fn take_due(&mut self, now: DateTime<Utc>, misfire_threshold: Duration) -> Vec<DueFiring> {
        let mut due: Vec<DueFiring> = self
            .manual
            .drain(..)
            .map(|detail| DueFiring {
                detail,
                refire_index: 0,
                scheduled_fire_time: None,
            })
            .collect();

        for entry in self.triggers.values_mut() {
            let Some(scheduled) = entry.next_fire_time.filter(|next| *next <= now) else {
                continue;
            };
            entry.next_fire_time = entry.trigger.next_fire_after(now);

            let late = (now - scheduled).to_std().unwrap_or_default();
            if late > misfire_threshold {
                match entry.trigger.misfire_policy() {
                    MisfirePolicy::DoNothing => {
                        info!(
                            "Trigger {} misfired ({}s late), skipping to {:?}",
                            entry.trigger.key(),
                            late.as_secs(),
                            entry.next_fire_time
                        );
                        continue;
                    }
                    MisfirePolicy::FireAndProceed => info!(
                        "Trigger {} misfired ({}s late), firing now",
                        entry.trigger.key(),
                        late.as_secs()
                    ),
                }
            }

            let Some(detail) = self.jobs.get(entry.trigger.job_key()) else {
                debug!("Trigger {} has no job, ignoring", entry.trigger.key());
                continue;
            };
            entry.previous_fire_time = Some(scheduled);
            due.push(DueFiring {
                detail: detail.clone(),
                refire_index: 0,
                scheduled_fire_time: Some(scheduled),
            });
        }

        let ready: Vec<RetryKey> = self
            .retries
            .iter()
            .filter(|(_, entry)| entry.due <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in ready {
            if let Some(entry) = self.retries.remove(&key) {
                if !self.jobs.contains_key(&entry.detail.key) {
                    debug!("Dropping refire {}: job no longer registered", key);
                    continue;
                }
                due.push(DueFiring {
                    detail: entry.detail,
                    refire_index: key.attempt_index + 1,
                    scheduled_fire_time: Some(entry.due),
                });
            }
        }

        due
    }

    /// Earliest trigger or retry due time.
    pub fn next_wakeup(&self) -> Option<DateTime<Utc>> {
        let triggers = self.triggers.values().filter_map(|e| e.next_fire_time);
        let retries = self.retries.values().map(|e| e.due);
        triggers.chain(retries).min()
    }

    /// Remove a job together with every trigger and refire pointing at it.
    pub fn remove_job(&mut self, key: &JobKey) -> bool {
        self.triggers.retain(|_, entry| entry.trigger.job_key() != key);
        self.purge_retries(key);
        self.jobs.remove(key).is_some()
    }

    /// Drop quarantined refires of a job. Returns how many were dropped.
    pub fn purge_retries(&mut self, key: &JobKey) -> usize {
        let before = self.retries.len();
        self.retries.retain(|_, entry| &entry.detail.key != key);
        before - self.retries.len()
    }

    pub fn running_for<'a>(&'a self, key: &'a JobKey) -> impl Iterator<Item = &'a Running> + 'a {
        self.executing.values().filter(move |r| &r.info.job_key == key)
    }
}
