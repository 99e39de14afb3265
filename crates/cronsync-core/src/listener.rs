//! Firing listener that records pending refires on the job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, warn};

use cronsync_protocols::{FiringListener, JobDefinition, JobResult, JobStore, RetryKey};

/// Marks a job [`JobResult::PendingRetry`] when the engine quarantines one of
/// its failed firings.
pub struct PendingRetryRecorder {
    store: Arc<dyn JobStore>,
}

impl PendingRetryRecorder {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FiringListener for PendingRetryRecorder {
    async fn refire_scheduled(&self, key: &RetryKey, job: &JobDefinition, refire_at: DateTime<Utc>) {
        warn!("Job '{}' quarantined as {}, refire at {}", job.job_id, key, refire_at);

        let mut fresh = match self.store.find_by_job_id(&job.job_id).await {
            Ok(Some(fresh)) => fresh,
            Ok(None) => return,
            Err(e) => {
                error!("Failed to load job '{}': {}", job.job_id, e);
                return;
            }
        };
        fresh.last_result = JobResult::PendingRetry;
        if let Err(e) = self.store.save(&fresh).await {
            error!("Failed to mark job '{}' pending retry: {}", job.job_id, e);
        }
    }
}
