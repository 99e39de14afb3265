//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, Offset, Utc};

use cronsync_core::JobStateSynchronizer;
use cronsync_protocols::JobStore;

/// Application state shared across handlers.
pub struct AppState {
    pub synchronizer: Arc<JobStateSynchronizer>,
    /// Offset used when rendering fire times as plain text.
    pub display_offset: FixedOffset,
    start_time: Instant,
}

impl AppState {
    pub fn new(synchronizer: Arc<JobStateSynchronizer>) -> Self {
        Self {
            synchronizer,
            display_offset: Utc.fix(),
            start_time: Instant::now(),
        }
    }

    pub fn with_display_offset(mut self, offset: FixedOffset) -> Self {
        self.display_offset = offset;
        self
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        self.synchronizer.store()
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// `yyyy-MM-dd HH:mm:ss` in the display offset.
    pub fn format_time(&self, time: DateTime<Utc>) -> String {
        time.with_timezone(&self.display_offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}
