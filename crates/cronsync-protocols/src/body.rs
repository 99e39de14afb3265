//! Job body protocol.

use async_trait::async_trait;

use crate::engine::FiringContext;
use crate::error::JobError;

/// The work a job group performs on each firing.
///
/// Bodies run inside an execution wrapper that records timing and refire
/// attempts; they only implement the core of the job.
#[async_trait]
pub trait JobBody: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run one firing. `ctx.execute_time` is set when this is called.
    ///
    /// Long-running bodies should watch `ctx.cancellation_token()` and stop
    /// at a safe point once it is cancelled.
    async fn executive_core(&self, ctx: &FiringContext) -> Result<(), JobError>;
}
