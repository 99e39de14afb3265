//! # cronsync Protocols
//!
//! Core data model and protocol definitions (traits) for cronsync.
//! Contains only interface definitions - no scheduler or store implementations.
//!
//! ## Core Traits
//!
//! - [`SchedulerPort`] - The scheduler engine as seen by the synchronizer
//! - [`JobStore`] - Persistent job definition storage
//! - [`JobBody`] - The work performed by one job group
//! - [`ScheduledJob`] - One firing-ready job instance handed to the engine
//! - [`JobFactory`] - Builds [`ScheduledJob`]s for registered job details

pub mod body;
pub mod engine;
pub mod error;
pub mod job;
pub mod key;
pub mod store;

pub use body::JobBody;
pub use engine::{
    CronTrigger, ExecutingJob, FiringContext, FiringListener, JobDetail, JobFactory,
    MisfirePolicy, ScheduledJob, SchedulerPort, TriggerInfo,
};
pub use error::{EngineError, JobError, StoreError};
pub use job::{JobDefinition, JobGroup, JobResult, JobStatus};
pub use key::{JobKey, RetryKey, TriggerKey};
pub use store::JobStore;
