//! # cronsync API
//!
//! HTTP admin surface over the job state synchronizer and the job store.
//!
//! ```text
//! /scheduler
//!   POST /scheduler/init?group=                 - Reconcile a whole group
//!   POST /scheduler/init/{id}?group=            - Reconcile one job
//!   POST /scheduler/jobs/{id}/run?create=       - Fire now
//!   POST /scheduler/jobs/{id}/remove            - Unregister
//!   POST /scheduler/jobs/{id}/remove-failing    - Drop pending refires
//!   POST /scheduler/jobs/{id}/stop              - Interrupt or drop refires
//!   POST /scheduler/jobs/{id}/cron?cron=        - Replace the cron expression
//!   POST /scheduler/jobs/{id}/status?status=    - Enable, disable or toggle
//!
//! /jobs
//!   GET    /jobs        - List job definitions
//!   POST   /jobs        - Create or replace a job definition
//!   GET    /jobs/{id}   - Get a job definition
//!   DELETE /jobs/{id}   - Unregister and delete a job definition
//!
//! /health               - Health check
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiServer, ServerConfig};
pub use state::AppState;
