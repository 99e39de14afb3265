use super::*;
use chrono::TimeZone;

const GROUP: &str = "API-Trigger-Group";

fn job(id: &str) -> JobDefinition {
    JobDefinition::new(id, format!("job {id}"), GROUP, "0 0 * * * ?")
        .with_strategy("https://example.com/load?date=${yyyyMMdd}")
}

#[tokio::test]
async fn test_find_missing_returns_none() {
    let store = SqliteJobStore::in_memory().await.unwrap();
    assert!(store.find_by_job_id("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_and_find_keeps_every_field() {
    let store = SqliteJobStore::in_memory().await.unwrap();
    let fired = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();

    let mut original = job("a1")
        .with_description("nightly load")
        .with_status(JobStatus::Enabled)
        .with_refire(3, 120);
    original.last_fire_time = Some(fired);
    original.last_complete_time = Some(fired + chrono::TimeDelta::seconds(5));
    original.next_fire_time = Some(fired + chrono::TimeDelta::hours(1));
    original.last_result = JobResult::Fail;
    original.error_accumulation = 2;

    store.save(&original).await.unwrap();
    let loaded = store.find_by_job_id("a1").await.unwrap().unwrap();

    assert_eq!(loaded, original);
}

#[tokio::test]
async fn test_save_overwrites_existing() {
    let store = SqliteJobStore::in_memory().await.unwrap();
    store.save(&job("a1")).await.unwrap();

    let mut updated = job("a1").with_status(JobStatus::Enabled);
    updated.cron_expression = "0 30 * * * ?".to_string();
    store.save(&updated).await.unwrap();

    let loaded = store.find_by_job_id("a1").await.unwrap().unwrap();
    assert_eq!(loaded.status, JobStatus::Enabled);
    assert_eq!(loaded.cron_expression, "0 30 * * * ?");
    assert_eq!(store.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_find_by_group_filters_and_sorts() {
    let store = SqliteJobStore::in_memory().await.unwrap();
    store.save(&job("b")).await.unwrap();
    store.save(&job("a")).await.unwrap();
    store
        .save(&JobDefinition::new("c", "etl", "ETL-Group", "0 0 * * * ?"))
        .await
        .unwrap();

    let ids: Vec<_> = store
        .find_by_job_group(GROUP)
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.job_id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(store.find_all().await.unwrap().len(), 3);
    assert!(store.find_by_job_group("Unknown").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete() {
    let store = SqliteJobStore::in_memory().await.unwrap();
    store.save(&job("a1")).await.unwrap();

    assert!(store.delete("a1").await.unwrap());
    assert!(!store.delete("a1").await.unwrap());
    assert!(store.find_by_job_id("a1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreadable_timestamp_loads_as_none() {
    let store = SqliteJobStore::in_memory().await.unwrap();
    store.save(&job("a1")).await.unwrap();
    store
        .conn
        .call(|conn| {
            conn.execute(
                "UPDATE jobs SET last_fire_time = 'yesterday' WHERE job_id = 'a1'",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

    let loaded = store.find_by_job_id("a1").await.unwrap().unwrap();
    assert!(loaded.last_fire_time.is_none());
}

#[tokio::test]
async fn test_file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("jobs.db");

    {
        let store = SqliteJobStore::open(&path).await.unwrap();
        store
            .save(&job("persisted").with_status(JobStatus::Enabled))
            .await
            .unwrap();
    }

    let reopened = SqliteJobStore::open(&path).await.unwrap();
    let loaded = reopened.find_by_job_id("persisted").await.unwrap().unwrap();
    assert_eq!(loaded.status, JobStatus::Enabled);
}
