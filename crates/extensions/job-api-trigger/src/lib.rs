//! API-trigger jobs for cronsync.
//!
//! Jobs in the `API-Trigger-Group` call an HTTP endpoint on every firing.
//! The job's strategy holds the URL template; date placeholders are
//! evaluated at fire time.

mod job;

pub use job::{ApiTriggerJob, HttpTimeouts};
