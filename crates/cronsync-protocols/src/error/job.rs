//! Job execution errors, returned by job bodies to the engine.

use thiserror::Error;

use super::StoreError;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Job was interrupted")]
    Interrupted,

    #[error("Job is not interruptible: {0}")]
    NotInterruptible(String),

    #[error("Expression error: {0}")]
    Expression(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
