//! # cronsync Engine
//!
//! In-process cron scheduler implementing [`SchedulerPort`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────── CronEngine ────────────────────────────┐
//! │  Registry (parking_lot::RwLock)                                    │
//! │    jobs ── triggers (next/previous fire) ── retries (quarantine)   │
//! │                                                                    │
//! │  timer loop (tokio task)                                           │
//! │    sleep until earliest due │ woken by Notify │ shutdown token     │
//! │        │                                                           │
//! │        ▼                                                           │
//! │  firing tasks (Semaphore: max_concurrent_jobs)                     │
//! │    JobFactory::new_job ─► ScheduledJob::execute                    │
//! │        │ Err and attempts left                                     │
//! │        ▼                                                           │
//! │    RetryKey { job_id, attempt_index } due after refire_interval    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use cronsync_engine::{CronEngine, EngineConfig};
//! use cronsync_protocols::JobFactory;
//! use std::sync::Arc;
//!
//! async fn example(factory: Arc<dyn JobFactory>) {
//!     let engine = CronEngine::new(EngineConfig::default(), factory);
//!     engine.start().unwrap();
//!     // ... register jobs through SchedulerPort ...
//!     engine.shutdown().await;
//! }
//! ```
//!
//! [`SchedulerPort`]: cronsync_protocols::SchedulerPort

mod config;
mod engine;
mod port;
mod registry;

pub use config::EngineConfig;
pub use engine::CronEngine;
