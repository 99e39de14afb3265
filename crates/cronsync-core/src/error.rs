//! Synchronizer errors.

use cronsync_protocols::{EngineError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Scheduler engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Job store error: {0}")]
    Store(#[from] StoreError),
}
