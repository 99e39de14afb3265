//! Scheduler engine errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Trigger not found: {0}")]
    TriggerNotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid cron expression '{expression}': {message}")]
    InvalidCron { expression: String, message: String },

    #[error("Trigger {0} will never fire")]
    WillNeverFire(String),

    #[error("Not a valid job group: {0}")]
    UnsupportedGroup(String),

    #[error("Unable to interrupt job: {0}")]
    UnableToInterrupt(String),

    #[error("Scheduler engine is shut down")]
    Shutdown,

    #[error("Scheduler engine unavailable: {0}")]
    Unavailable(String),
}
