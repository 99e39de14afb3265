//! Job definition CRUD handlers.
//!
//! - POST   /jobs       - Create or replace a job definition
//! - GET    /jobs       - List job definitions
//! - GET    /jobs/{id}  - Get a job definition
//! - DELETE /jobs/{id}  - Unregister and delete a job definition
//!
//! Creating a job only stores it; `/scheduler/init` brings the engine in line.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::info;

use cronsync_protocols::{CronTrigger, JobDefinition};

use crate::error::ApiError;
use crate::state::AppState;

/// Response for listing jobs.
#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub count: usize,
    pub jobs: Vec<JobDefinition>,
}

fn validate(job: &JobDefinition) -> Result<(), ApiError> {
    if job.job_id.trim().is_empty() {
        return Err(ApiError::BadRequest("job_id must not be empty".to_string()));
    }
    if job.job_group.trim().is_empty() {
        return Err(ApiError::BadRequest("job_group must not be empty".to_string()));
    }
    CronTrigger::for_job(job).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(())
}

/// POST /jobs
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(job): Json<JobDefinition>,
) -> Result<(StatusCode, Json<JobDefinition>), ApiError> {
    validate(&job)?;
    info!("Saving job: {} (cron: {})", job.job_id, job.cron_expression);
    state.store().save(&job).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /jobs
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JobListResponse>, ApiError> {
    let jobs = state.store().find_all().await?;
    Ok(Json(JobListResponse {
        count: jobs.len(),
        jobs,
    }))
}

/// GET /jobs/{id}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobDefinition>, ApiError> {
    state
        .store()
        .find_by_job_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job '{}' not found", id)))
}

/// DELETE /jobs/{id}
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.synchronizer.remove_job(&id).await?;
    if state.store().delete(&id).await? {
        info!("Deleted job: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Job '{}' not found", id)))
    }
}
