//! In-memory job store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use cronsync_protocols::{JobDefinition, JobStore, StoreError};

/// [`JobStore`] backed by a map. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, JobDefinition>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `jobs`.
    pub fn with_jobs(jobs: impl IntoIterator<Item = JobDefinition>) -> Self {
        let jobs = jobs
            .into_iter()
            .map(|job| (job.job_id.clone(), job))
            .collect();
        Self {
            jobs: RwLock::new(jobs),
        }
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn find_by_job_id(&self, job_id: &str) -> Result<Option<JobDefinition>, StoreError> {
        Ok(self.jobs.read().await.get(job_id).cloned())
    }

    async fn find_by_job_group(&self, group: &str) -> Result<Vec<JobDefinition>, StoreError> {
        let jobs = self.jobs.read().await;
        let mut found: Vec<JobDefinition> = jobs
            .values()
            .filter(|job| job.job_group == group)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        Ok(found)
    }

    async fn find_all(&self) -> Result<Vec<JobDefinition>, StoreError> {
        let mut all: Vec<JobDefinition> = self.jobs.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        Ok(all)
    }

    async fn save(&self, job: &JobDefinition) -> Result<(), StoreError> {
        self.jobs
            .write()
            .await
            .insert(job.job_id.clone(), job.clone());
        Ok(())
    }

    async fn delete(&self, job_id: &str) -> Result<bool, StoreError> {
        Ok(self.jobs.write().await.remove(job_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, group: &str) -> JobDefinition {
        JobDefinition::new(id, format!("{id} name"), group, "0 0 * * * ?")
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = MemoryJobStore::new();
        store.save(&job("a", "API-Trigger-Group")).await.unwrap();

        let found = store.find_by_job_id("a").await.unwrap().unwrap();
        assert_eq!(found.job_name, "a name");
        assert!(store.find_by_job_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = MemoryJobStore::with_jobs([job("a", "API-Trigger-Group")]);
        let mut updated = job("a", "API-Trigger-Group");
        updated.error_accumulation = 3;
        store.save(&updated).await.unwrap();

        assert_eq!(store.find_all().await.unwrap().len(), 1);
        assert_eq!(
            store.find_by_job_id("a").await.unwrap().unwrap().error_accumulation,
            3
        );
    }

    #[tokio::test]
    async fn test_find_by_group_sorted() {
        let store = MemoryJobStore::with_jobs([
            job("c", "API-Trigger-Group"),
            job("b", "ETL-Group"),
            job("a", "API-Trigger-Group"),
        ]);

        let ids: Vec<String> = store
            .find_by_job_group("API-Trigger-Group")
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.job_id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryJobStore::with_jobs([job("a", "ETL-Group")]);
        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
    }
}
