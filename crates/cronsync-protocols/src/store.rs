//! Job definition store protocol.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::job::JobDefinition;

/// Persistent job definition storage. Writes are last-write-wins per job ID.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Load a job by ID.
    async fn find_by_job_id(&self, job_id: &str) -> Result<Option<JobDefinition>, StoreError>;

    /// Load all jobs of a group.
    async fn find_by_job_group(&self, group: &str) -> Result<Vec<JobDefinition>, StoreError>;

    /// Load all jobs.
    async fn find_all(&self) -> Result<Vec<JobDefinition>, StoreError>;

    /// Insert or replace a job.
    async fn save(&self, job: &JobDefinition) -> Result<(), StoreError>;

    /// Delete a job. Returns whether it existed.
    async fn delete(&self, job_id: &str) -> Result<bool, StoreError>;
}
