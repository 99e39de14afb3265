//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::http::{jobs, monitoring, scheduler};
use crate::state::AppState;

/// Create the admin router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let scheduler_routes = Router::new()
        .route("/init", post(scheduler::init_group))
        .route("/init/{id}", post(scheduler::init_job))
        .route("/jobs/{id}/run", post(scheduler::run_job))
        .route("/jobs/{id}/remove", post(scheduler::remove_job))
        .route("/jobs/{id}/remove-failing", post(scheduler::remove_failing))
        .route("/jobs/{id}/stop", post(scheduler::stop_job))
        .route("/jobs/{id}/cron", post(scheduler::update_cron))
        .route("/jobs/{id}/status", post(scheduler::update_status));

    let job_routes = Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::create_job))
        .route("/{id}", get(jobs::get_job).delete(jobs::delete_job));

    Router::new()
        .nest("/scheduler", scheduler_routes)
        .nest("/jobs", job_routes)
        .route("/health", get(monitoring::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
