//! API-trigger job body.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use cronsync_expr::DateExpressionEvaluator;
use cronsync_protocols::{
    CronTrigger, FiringContext, JobBody, JobDefinition, JobError, JobResult, JobStore,
};

/// Longest response body excerpt written to the log.
const MAX_LOGGED_BODY: usize = 512;

/// Timeouts for the outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            read: Duration::from_secs(15 * 60),
        }
    }
}

enum CallOutcome {
    Success,
    Failed(String),
    Interrupted,
}

/// Calls the job's URL with an HTTP GET on every firing and records the
/// outcome on the stored job definition.
pub struct ApiTriggerJob {
    store: Arc<dyn JobStore>,
    evaluator: Arc<DateExpressionEvaluator>,
    client: Client,
}

impl ApiTriggerJob {
    pub fn new(
        store: Arc<dyn JobStore>,
        evaluator: Arc<DateExpressionEvaluator>,
        timeouts: HttpTimeouts,
    ) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .user_agent(concat!("cronsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            store,
            evaluator,
            client,
        })
    }

    fn next_fire(job: &JobDefinition, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match CronTrigger::for_job(job) {
            Ok(trigger) => trigger.next_fire_after(after),
            Err(e) => {
                warn!("Job {} has no usable schedule: {}", job.job_id, e);
                None
            }
        }
    }

    async fn call(&self, ctx: &FiringContext, url: &str) -> CallOutcome {
        let request = async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        tokio::select! {
            _ = ctx.cancellation_token().cancelled() => CallOutcome::Interrupted,
            result = request => match result {
                Ok((status, body)) => {
                    info!(
                        "Job {} got {} from {}: {}",
                        ctx.job_key,
                        status,
                        url,
                        excerpt(&body)
                    );
                    if status.is_success() {
                        CallOutcome::Success
                    } else {
                        CallOutcome::Failed(format!("HTTP {}", status))
                    }
                }
                Err(e) => CallOutcome::Failed(e.to_string()),
            },
        }
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(MAX_LOGGED_BODY) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

#[async_trait]
impl JobBody for ApiTriggerJob {
    fn name(&self) -> &str {
        "api-trigger"
    }

    async fn executive_core(&self, ctx: &FiringContext) -> Result<(), JobError> {
        let job_id = &ctx.definition.job_id;
        let Some(mut job) = self.store.find_by_job_id(job_id).await? else {
            warn!("Job {} no longer exists in the store, skipping firing", job_id);
            return Ok(());
        };

        let url = self
            .evaluator
            .normalize(&job.job_strategy)
            .map_err(|e| JobError::Expression(e.to_string()))?;

        let execute_time = ctx.execute_time.unwrap_or_else(Utc::now);
        job.last_fire_time = Some(execute_time);
        job.last_result = JobResult::Executing;
        job.next_fire_time = Self::next_fire(&job, execute_time);
        self.store.save(&job).await?;

        info!("Job {} calling {}", job_id, url);
        let outcome = self.call(ctx, &url).await;
        match &outcome {
            CallOutcome::Success => {
                job.error_accumulation = 0;
                job.last_result = JobResult::Success;
            }
            CallOutcome::Failed(reason) => {
                job.error_accumulation = job.error_accumulation.saturating_add(1);
                job.last_result = JobResult::Fail;
                error!(
                    "Job {} call to {} failed ({} consecutive): {}",
                    job_id, url, job.error_accumulation, reason
                );
            }
            CallOutcome::Interrupted => {
                job.last_result = JobResult::Awaiting;
                info!("Job {} interrupted while calling {}", job_id, url);
            }
        }

        job.last_complete_time = Some(Utc::now());
        self.store.save(&job).await?;

        match outcome {
            CallOutcome::Interrupted => Err(JobError::Interrupted),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
