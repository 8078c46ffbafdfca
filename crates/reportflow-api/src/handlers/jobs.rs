//! Report job lifecycle handlers.
//!
//! Every handler is mounted once per job family; [`JobFamily`] resolves the
//! family's service from the route.

use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;

use reportflow_entity::job::{JobInformation, JobLog};
use reportflow_worker::ScheduledJobView;

use crate::dto::request::CreateReportJobRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{JobFamily, ValidatedJson, parse_job_id};

/// POST /job/report/{family}
pub async fn run_job(
    family: JobFamily,
    ValidatedJson(req): ValidatedJson<CreateReportJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JobInformation>>), ApiError> {
    let job = req.into_job(family.kind())?;
    let job = family.0.run_job(job).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(job))))
}

/// GET /job/report/{family}
pub async fn list_jobs(
    family: JobFamily,
) -> Result<Json<ApiResponse<Vec<JobInformation>>>, ApiError> {
    Ok(Json(ApiResponse::ok(family.get_all_jobs().await?)))
}

/// GET /job/report/{family}/scheduled
pub async fn scheduled_jobs(
    family: JobFamily,
) -> Result<Json<ApiResponse<Vec<ScheduledJobView>>>, ApiError> {
    Ok(Json(ApiResponse::ok(family.get_scheduled_jobs().await?)))
}

/// GET /job/report/{family}/{id}
pub async fn get_job(
    family: JobFamily,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<JobInformation>>, ApiError> {
    let id = parse_job_id(&id)?;
    Ok(Json(ApiResponse::ok(family.get_job(id).await?)))
}

/// PUT /job/report/{family}/{id}/stop
pub async fn stop_job(
    family: JobFamily,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<JobInformation>>, ApiError> {
    let id = parse_job_id(&id)?;
    Ok(Json(ApiResponse::ok(family.stop_job(id).await?)))
}

/// PUT /job/report/{family}/{id}/restart
pub async fn restart_job(
    family: JobFamily,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<JobInformation>>, ApiError> {
    let id = parse_job_id(&id)?;
    Ok(Json(ApiResponse::ok(family.restart_job(id).await?)))
}

/// DELETE /job/report/{family}/{id}
pub async fn delete_job(
    family: JobFamily,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_job_id(&id)?;
    family.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /job/report/{family}/{id}/logs
pub async fn job_logs(
    family: JobFamily,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<JobLog>>>, ApiError> {
    let id = parse_job_id(&id)?;
    Ok(Json(ApiResponse::ok(family.get_logs(id).await?)))
}
