//! # cronsync Core
//!
//! Reconciles persisted job definitions with the scheduler engine and wraps
//! job bodies for execution.
//!
//! ## Components
//!
//! - [`JobStateSynchronizer`] - Keeps engine registration in step with each job's status
//! - [`ExecutionWrapper`] - Timing, refire logging and interruption around a [`JobBody`]
//! - [`GroupJobFactory`] - Binds job groups to job bodies for the engine
//! - [`MemoryJobStore`] - In-memory [`JobStore`]
//! - [`PendingRetryRecorder`] - Marks jobs whose failed firing is waiting to refire
//!
//! [`JobBody`]: cronsync_protocols::JobBody
//! [`JobStore`]: cronsync_protocols::JobStore

pub mod error;
pub mod factory;
pub mod listener;
pub mod store;
pub mod synchronizer;
pub mod wrapper;

#[cfg(test)]
pub(crate) mod testing;

pub use error::SyncError;
pub use factory::GroupJobFactory;
pub use listener::PendingRetryRecorder;
pub use store::MemoryJobStore;
pub use synchronizer::JobStateSynchronizer;
pub use wrapper::{ExecutionWrapper, format_elapsed};
