//! Route definitions for the ReportFlow HTTP API.
//!
//! Each job family gets the same lifecycle routes, nested under its own
//! base path with the family's [`JobKind`] attached as a request extension.

use axum::{
    Extension, Router, middleware as axum_middleware,
    routing::{get, put},
};
use tower_http::trace::TraceLayer;

use reportflow_entity::job::JobKind;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Base path of the personal report routes.
pub const PERSONAL_REPORT_BASE: &str = "/job/report/personal";
/// Base path of the project report routes.
pub const PROJECT_REPORT_BASE: &str = "/job/report/project";

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest(PERSONAL_REPORT_BASE, family_routes(JobKind::PersonalReport))
        .nest(PROJECT_REPORT_BASE, family_routes(JobKind::ProjectReport))
        .route("/api/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Lifecycle routes for one family.
fn family_routes(kind: JobKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::jobs::list_jobs).post(handlers::jobs::run_job),
        )
        .route("/scheduled", get(handlers::jobs::scheduled_jobs))
        .route(
            "/{id}",
            get(handlers::jobs::get_job).delete(handlers::jobs::delete_job),
        )
        .route("/{id}/stop", put(handlers::jobs::stop_job))
        .route("/{id}/restart", put(handlers::jobs::restart_job))
        .route("/{id}/logs", get(handlers::jobs::job_logs))
        .layer(Extension(kind))
}
