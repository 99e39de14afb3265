//! Group-to-body job factory.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use cronsync_protocols::{EngineError, JobBody, JobDetail, JobFactory, ScheduledJob};

use crate::wrapper::ExecutionWrapper;

/// Binds job groups to job bodies.
///
/// Every firing gets a fresh [`ExecutionWrapper`] around the group's body.
#[derive(Default)]
pub struct GroupJobFactory {
    bodies: DashMap<String, Arc<dyn JobBody>>,
}

impl GroupJobFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `group` to `body`, replacing any previous binding.
    pub fn register(&self, group: impl Into<String>, body: Arc<dyn JobBody>) {
        let group = group.into();
        debug!("Binding job group '{}' to body '{}'", group, body.name());
        self.bodies.insert(group, body);
    }

    pub fn with_body(self, group: impl Into<String>, body: Arc<dyn JobBody>) -> Self {
        self.register(group, body);
        self
    }

    /// Registered group names.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.bodies.iter().map(|e| e.key().clone()).collect();
        groups.sort();
        groups
    }
}

impl JobFactory for GroupJobFactory {
    fn supports(&self, group: &str) -> bool {
        self.bodies.contains_key(group)
    }

    fn new_job(&self, detail: &JobDetail) -> Result<Arc<dyn ScheduledJob>, EngineError> {
        let body = self
            .bodies
            .get(&detail.key.group)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::UnsupportedGroup(detail.key.group.clone()))?;
        Ok(Arc::new(ExecutionWrapper::new(body)))
    }
}
