use super::*;

#[test]
fn test_job_status_codes() {
    assert_eq!(JobStatus::Disabled.code(), 0);
    assert_eq!(JobStatus::Enabled.code(), 1);
    assert_eq!(JobStatus::from_code(1), JobStatus::Enabled);
    assert_eq!(JobStatus::from_code(0), JobStatus::Disabled);
}

#[test]
fn test_job_status_unknown_code_is_disabled() {
    assert_eq!(JobStatus::from_code(7), JobStatus::Disabled);
    assert_eq!(JobStatus::from_code(-1), JobStatus::Disabled);
}

#[test]
fn test_job_status_toggle() {
    assert_eq!(JobStatus::Disabled.toggle(), JobStatus::Enabled);
    assert_eq!(JobStatus::Enabled.toggle(), JobStatus::Disabled);
    assert!(JobStatus::Enabled.is_enabled());
    assert!(!JobStatus::Disabled.is_enabled());
}

#[test]
fn test_job_result_codes() {
    for result in [
        JobResult::Awaiting,
        JobResult::Success,
        JobResult::Executing,
        JobResult::Fail,
        JobResult::PendingRetry,
    ] {
        assert_eq!(JobResult::from_code(result.code()), result);
    }
    assert_eq!(JobResult::PendingRetry.code(), 4);
    assert_eq!(JobResult::from_code(42), JobResult::Awaiting);
}

#[test]
fn test_job_group_names() {
    assert_eq!(JobGroup::ApiTrigger.name(), "API-Trigger-Group");
    assert_eq!(JobGroup::from_name("ETL-Group"), Some(JobGroup::Etl));
    assert_eq!(JobGroup::from_name("api-trigger-group"), None);
    assert_eq!(JobGroup::SqlCaller.to_string(), "SQL-Caller-Group");
}

#[test]
fn test_job_definition_new() {
    let job = JobDefinition::new("job-1", "Daily report", "API-Trigger-Group", "0 0 * * * ?");
    assert_eq!(job.job_id, "job-1");
    assert_eq!(job.status, JobStatus::Disabled);
    assert_eq!(job.last_result, JobResult::Awaiting);
    assert_eq!(job.refire_max_count, 0);
    assert_eq!(job.refire_interval, 60);
    assert!(job.next_fire_time.is_none());
}

#[test]
fn test_job_definition_builders() {
    let job = JobDefinition::new("job-1", "Report", "API-Trigger-Group", "0 0 * * * ?")
        .with_strategy("uri://http://example.com/${TODAY}")
        .with_description("nightly")
        .with_status(JobStatus::Enabled)
        .with_refire(3, 10);
    assert_eq!(job.job_strategy, "uri://http://example.com/${TODAY}");
    assert_eq!(job.job_desc.as_deref(), Some("nightly"));
    assert!(job.status.is_enabled());
    assert_eq!(job.refire_max_count, 3);
    assert_eq!(job.refire_interval, 10);
}

#[test]
fn test_job_definition_keys() {
    let job = JobDefinition::new("job-1", "Report", "API-Trigger-Group", "0 0 * * * ?");
    assert_eq!(job.job_key().name, "job-1");
    assert_eq!(job.job_key().group, "API-Trigger-Group");
    assert_eq!(job.trigger_key().name, "job-1");
}

#[test]
fn test_retry_keys_cover_every_attempt_index() {
    let job = JobDefinition::new("job-1", "Report", "API-Trigger-Group", "0 0 * * * ?")
        .with_refire(3, 5);
    let keys: Vec<RetryKey> = job.retry_keys().collect();
    assert_eq!(keys.len(), 3);
    assert_eq!(keys[0], RetryKey::new("job-1", 0));
    assert_eq!(keys[2], RetryKey::new("job-1", 2));

    let no_refire = JobDefinition::new("job-2", "x", "API-Trigger-Group", "0 0 * * * ?");
    assert_eq!(no_refire.retry_keys().count(), 0);
}

#[test]
fn test_job_definition_deserialize_defaults() {
    let json = r#"{
        "job_id": "job-9",
        "job_name": "Minimal",
        "job_group": "API-Trigger-Group",
        "cron_expression": "0 */5 * * * ?"
    }"#;
    let job: JobDefinition = serde_json::from_str(json).unwrap();
    assert_eq!(job.status, JobStatus::Disabled);
    assert_eq!(job.last_result, JobResult::Awaiting);
    assert_eq!(job.refire_interval, 60);
    assert!(job.job_strategy.is_empty());
}

#[test]
fn test_job_definition_serialization() {
    let job = JobDefinition::new("job-1", "Report", "API-Trigger-Group", "0 0 * * * ?")
        .with_status(JobStatus::Enabled);
    let json = serde_json::to_string(&job).unwrap();
    assert!(json.contains("\"status\":\"enabled\""));
    assert!(json.contains("\"last_result\":\"awaiting\""));
    assert!(!json.contains("job_desc"));
}
