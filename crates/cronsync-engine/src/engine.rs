//! CronEngine - in-process cron scheduler.
//!
//! One tokio task drives the timer loop. It sleeps until the earliest due
//! trigger or refire, or until a registry change wakes it. Every firing runs
//! in its own task, bounded by a semaphore.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use cronsync_protocols::{
    EngineError, ExecutingJob, FiringContext, FiringListener, JobDetail, JobError, JobFactory,
    RetryKey,
};

use crate::config::EngineConfig;
use crate::registry::{DueFiring, Registry, RetryEntry, Running};

/// Upper bound on one sleep of the timer loop when nothing is scheduled.
const IDLE_WAIT: Duration = Duration::from_secs(60);

/// In-process scheduler engine.
///
/// Cheap to clone; clones share the same registry and timer loop.
#[derive(Clone)]
pub struct CronEngine {
    pub(crate) inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    pub config: EngineConfig,
    pub factory: Arc<dyn JobFactory>,
    pub listeners: RwLock<Vec<Arc<dyn FiringListener>>>,
    pub registry: RwLock<Registry>,
    pub wakeup: Notify,
    pub permits: Arc<Semaphore>,
    pub shutdown: CancellationToken,
    pub started: AtomicBool,
    pub timer_loop: Mutex<Option<JoinHandle<()>>>,
}

impl CronEngine {
    pub fn new(config: EngineConfig, factory: Arc<dyn JobFactory>) -> Self {
        let permits = Arc::new(Semaphore::new(config.permits()));
        Self {
            inner: Arc::new(EngineInner {
                config,
                factory,
                listeners: RwLock::new(Vec::new()),
                registry: RwLock::new(Registry::default()),
                wakeup: Notify::new(),
                permits,
                shutdown: CancellationToken::new(),
                started: AtomicBool::new(false),
                timer_loop: Mutex::new(None),
            }),
        }
    }

    /// Register a listener for refire events.
    pub fn add_listener(&self, listener: Arc<dyn FiringListener>) {
        self.inner.listeners.write().push(listener);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Start the timer loop. Jobs may be registered before or after.
    pub fn start(&self) -> Result<(), EngineError> {
        if self.is_shutdown() {
            return Err(EngineError::Shutdown);
        }
        if self.inner.started.swap(true, Ordering::SeqCst) {
            warn!("Cron engine already started");
            return Ok(());
        }

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move { inner.run().await });
        *self.inner.timer_loop.lock() = Some(handle);
        info!(
            "Cron engine started (max_concurrent_jobs={}, misfire_threshold={}s)",
            self.inner.config.max_concurrent_jobs, self.inner.config.misfire_threshold_secs
        );
        Ok(())
    }

    /// Stop the timer loop and interrupt every running firing.
    pub async fn shutdown(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        self.inner.shutdown.cancel();

        let running: Vec<_> = self
            .inner
            .registry
            .read()
            .executing
            .values()
            .map(|r| (r.info.job_key.clone(), r.job.clone()))
            .collect();
        for (key, job) in running {
            if let Err(e) = job.interrupt() {
                debug!("Job {} not interrupted on shutdown: {}", key, e);
            }
        }

        let handle = self.inner.timer_loop.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Cron engine timer loop ended abnormally: {}", e);
            }
        }
        info!("Cron engine shut down");
    }

    pub(crate) fn ensure_running(&self) -> Result<(), EngineError> {
        if self.is_shutdown() {
            return Err(EngineError::Shutdown);
        }
        Ok(())
    }

    pub(crate) fn wake(&self) {
        self.inner.wakeup.notify_one();
    }
}

impl EngineInner {
    async fn run(self: Arc<Self>) {
        loop {
            let due = self
                .registry
                .write()
                .take_due(Utc::now(), self.config.misfire_threshold());
            for firing in due {
                self.spawn_firing(firing);
            }

            let wait = self
                .registry
                .read()
                .next_wakeup()
                .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
                .unwrap_or(IDLE_WAIT)
                .min(IDLE_WAIT);

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = self.wakeup.notified() => {}
                _ = tokio::time::sleep(wait) => {}
            }
        }
        debug!("Cron engine timer loop exited");
    }

    fn spawn_firing(self: &Arc<Self>, firing: DueFiring) {
        let inner = self.clone();
        tokio::spawn(async move {
            let permit = tokio::select! {
                permit = inner.permits.clone().acquire_owned() => permit,
                _ = inner.shutdown.cancelled() => return,
            };
            let Ok(_permit) = permit else {
                return;
            };
            inner.fire(firing).await;
        });
    }

    async fn fire(&self, firing: DueFiring) {
        let DueFiring {
            detail,
            refire_index,
            scheduled_fire_time,
        } = firing;

        let job = match self.factory.new_job(&detail) {
            Ok(job) => job,
            Err(e) => {
                error!("Cannot build job {}: {}", detail.key, e);
                return;
            }
        };

        let mut ctx = FiringContext::new(detail.key.clone(), detail.definition.clone(), Utc::now())
            .with_refire_index(refire_index);
        if let Some(at) = scheduled_fire_time {
            ctx = ctx.with_scheduled_fire_time(at);
        }
        let fire_id = ctx.fire_id;

        self.registry.write().executing.insert(
            fire_id,
            Running {
                info: ExecutingJob {
                    fire_id,
                    job_key: detail.key.clone(),
                    definition: detail.definition.clone(),
                    refire_index,
                    fire_time: ctx.fire_time,
                },
                job: job.clone(),
            },
        );
        debug!("Firing {} (fire {}, refire {})", detail.key, fire_id, refire_index);

        let result = job.execute(&mut ctx).await;
        self.registry.write().executing.remove(&fire_id);

        match result {
            Ok(()) => debug!("Firing {} of {} completed", fire_id, detail.key),
            Err(JobError::Interrupted) => info!("Firing {} of {} interrupted", fire_id, detail.key),
            Err(e) => {
                warn!("Firing {} of {} failed: {}", fire_id, detail.key, e);
                self.quarantine(detail, refire_index).await;
            }
        }
    }

    /// Park a failed firing under its refire key, if attempts remain.
    async fn quarantine(&self, detail: JobDetail, refire_index: u32) {
        let definition = detail.definition.clone();
        if refire_index >= definition.refire_max_count {
            if definition.refire_max_count > 0 {
                error!(
                    "Job '{}' failed after {} refire attempt(s), giving up until next schedule",
                    definition.job_id, refire_index
                );
            }
            return;
        }

        let key = RetryKey::new(&definition.job_id, refire_index);
        let now = Utc::now();
        let due = i64::try_from(definition.refire_interval)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|interval| now.checked_add_signed(interval))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        {
            let mut registry = self.registry.write();
            if !registry.jobs.contains_key(&detail.key) {
                debug!("Job {} no longer registered, not refiring", detail.key);
                return;
            }
            registry.retries.insert(key.clone(), RetryEntry { due, detail });
        }
        self.wakeup.notify_one();

        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.refire_scheduled(&key, &definition, due).await;
        }
    }
}
