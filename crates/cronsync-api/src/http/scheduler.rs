//! Synchronizer route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use cronsync_protocols::{JobDefinition, JobGroup, JobResult, JobStatus};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GroupQuery {
    group: Option<String>,
}

impl GroupQuery {
    fn group(&self) -> &str {
        self.group
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .unwrap_or(JobGroup::ApiTrigger.name())
    }
}

#[derive(Debug, Deserialize)]
pub struct RunQuery {
    /// Enable and register the job first when it is not scheduled.
    #[serde(default = "default_create")]
    create: bool,
}

fn default_create() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CronQuery {
    cron: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    status: Option<String>,
}

/// State of one job after reconciliation.
#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub job_id: String,
    pub job_name: String,
    pub job_group: String,
    pub status: JobStatus,
    pub last_result: JobResult,
    pub next_fire_time: Option<DateTime<Utc>>,
}

impl From<JobDefinition> for JobSummary {
    fn from(job: JobDefinition) -> Self {
        Self {
            job_id: job.job_id,
            job_name: job.job_name,
            job_group: job.job_group,
            status: job.status,
            last_result: job.last_result,
            next_fire_time: job.next_fire_time,
        }
    }
}

/// Parse a requested status. Empty means toggle.
fn parse_status(raw: Option<&str>) -> Result<Option<JobStatus>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "enabled" | "enable" | "true" => Ok(Some(JobStatus::Enabled)),
        "0" | "disabled" | "disable" | "false" => Ok(Some(JobStatus::Disabled)),
        other => Err(ApiError::BadRequest(format!("Unknown job status '{}'", other))),
    }
}

/// POST /scheduler/init?group=
pub async fn init_group(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GroupQuery>,
) -> Result<Json<Vec<JobSummary>>, ApiError> {
    let jobs = state.synchronizer.dispatch_group(query.group(), &[]).await?;
    Ok(Json(jobs.into_iter().map(JobSummary::from).collect()))
}

/// POST /scheduler/init/{id}?group=
pub async fn init_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<GroupQuery>,
) -> Result<Json<Vec<JobSummary>>, ApiError> {
    let jobs = state
        .synchronizer
        .dispatch_group(query.group(), &[id])
        .await?;
    Ok(Json(jobs.into_iter().map(JobSummary::from).collect()))
}

/// POST /scheduler/jobs/{id}/run
pub async fn run_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<RunQuery>,
) -> Result<Json<Value>, ApiError> {
    let triggered = state.synchronizer.trigger_now(&id, query.create).await?;
    Ok(Json(json!({ "triggered": triggered })))
}

/// POST /scheduler/jobs/{id}/remove
pub async fn remove_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.synchronizer.remove_job(&id).await?;
    Ok(Json(json!({ "removed": removed })))
}

/// POST /scheduler/jobs/{id}/remove-failing
pub async fn remove_failing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.synchronizer.remove_failing_retry_jobs(&id).await?;
    Ok(Json(json!({ "removed": removed })))
}

/// POST /scheduler/jobs/{id}/stop
pub async fn stop_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let stopped = state.synchronizer.stop_now(std::slice::from_ref(&id)).await?
        || state.synchronizer.remove_failing_retry_jobs(&id).await? > 0;
    info!("Stop requested for job '{}': stopped={}", id, stopped);
    Ok(Json(json!({ "stopped": stopped })))
}

/// POST /scheduler/jobs/{id}/cron?cron=
///
/// Responds with the next fire time as plain text, empty for unknown jobs.
pub async fn update_cron(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<CronQuery>,
) -> Result<String, ApiError> {
    let next = state.synchronizer.update_cron(&id, &query.cron).await?;
    Ok(next.map(|t| state.format_time(t)).unwrap_or_default())
}

/// POST /scheduler/jobs/{id}/status?status=
///
/// Responds with the next fire time as plain text, empty when the job ends
/// up disabled or is unknown.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<String, ApiError> {
    let status = parse_status(query.status.as_deref())?;
    let next = state.synchronizer.update_status(&id, status).await?;
    Ok(next.map(|t| state.format_time(t)).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some(" ")).unwrap(), None);
        assert_eq!(parse_status(Some("1")).unwrap(), Some(JobStatus::Enabled));
        assert_eq!(parse_status(Some("Disabled")).unwrap(), Some(JobStatus::Disabled));
        assert!(parse_status(Some("maybe")).is_err());
    }

    #[test]
    fn test_group_defaults_to_api_trigger() {
        let query = GroupQuery { group: None };
        assert_eq!(query.group(), "API-Trigger-Group");
        let query = GroupQuery {
            group: Some("ETL-Group".to_string()),
        };
        assert_eq!(query.group(), "ETL-Group");
    }
}
