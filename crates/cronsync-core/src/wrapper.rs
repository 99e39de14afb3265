//! Execution wrapper around a job body.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cronsync_protocols::{FiringContext, JobBody, JobError, ScheduledJob};

/// One firing of a [`JobBody`], with timing, refire logging and interruption.
///
/// The engine builds a fresh wrapper per firing, so the captured
/// cancellation token always belongs to the current firing.
pub struct ExecutionWrapper {
    body: Arc<dyn JobBody>,
    cancel: Mutex<Option<CancellationToken>>,
}

/// How a firing is announced before the body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt {
    First,
    Retry,
    /// At or past the refire limit; not announced.
    Final,
}

impl Attempt {
    pub(crate) fn classify(refire_index: u32, refire_max_count: u32) -> Self {
        if refire_index == 0 {
            Self::First
        } else if refire_index < refire_max_count {
            Self::Retry
        } else {
            Self::Final
        }
    }
}

impl ExecutionWrapper {
    pub fn new(body: Arc<dyn JobBody>) -> Self {
        Self {
            body,
            cancel: Mutex::new(None),
        }
    }

    pub fn body_name(&self) -> &str {
        self.body.name()
    }
}

#[async_trait]
impl ScheduledJob for ExecutionWrapper {
    async fn execute(&self, ctx: &mut FiringContext) -> Result<(), JobError> {
        *self.cancel.lock() = Some(ctx.cancellation_token().clone());

        let started = Instant::now();
        ctx.execute_time = Some(Utc::now());

        let job_id = ctx.definition.job_id.clone();
        let max_refires = ctx.definition.refire_max_count;
        match Attempt::classify(ctx.refire_index, max_refires) {
            Attempt::First => info!("Job '{}' ({}) begin", job_id, self.body.name()),
            Attempt::Retry => warn!(
                "Job '{}' ({}) retry attempt {} of {}",
                job_id,
                self.body.name(),
                ctx.refire_index,
                max_refires
            ),
            Attempt::Final => {}
        }

        let result = self.body.executive_core(ctx).await;

        info!(
            "Job '{}' finished in {}",
            job_id,
            format_elapsed(started.elapsed())
        );
        result
    }

    fn interrupt(&self) -> Result<(), JobError> {
        match self.cancel.lock().as_ref() {
            Some(token) => {
                debug!("Cancelling running firing of '{}'", self.body.name());
                token.cancel();
            }
            None => debug!("Interrupt before start of '{}' ignored", self.body.name()),
        }
        Ok(())
    }
}

/// Human-readable elapsed time: `"250ms"` below a second, otherwise
/// `"{h}h{m}m{s}s"` followed by any leftover milliseconds.
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        return format!("{millis}ms");
    }

    let secs = elapsed.as_secs();
    let mut out = format!("{}h{}m{}s", secs / 3600, (secs % 3600) / 60, secs % 60);
    let rest = millis % 1000;
    if rest > 0 {
        out.push_str(&format!("{rest}ms"));
    }
    out
}

#[cfg(test)]
#[path = "wrapper_tests.rs"]
mod tests;
