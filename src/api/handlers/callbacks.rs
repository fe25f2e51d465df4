//! Worker callback handlers.
//!
//! Workers report progress and outcomes here. There is no caller principal;
//! the routes are guarded by the shared callback token instead.

use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::CALLBACK_TAG;
use crate::api::dto::{CompleteJobRequest, ErrorResponse, FailJobRequest, JobResponse};
use crate::api::extract::JobIdPath;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates callback routes, nested under `/internal/jobs`.
pub fn callback_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(mark_processing))
        .routes(routes!(complete_job))
        .routes(routes!(fail_job))
}

/// POST /internal/jobs/{id}/processing - A worker picked the job up
#[utoipa::path(
    post,
    path = "/{id}/processing",
    tag = CALLBACK_TAG,
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job is processing", body = JobResponse),
        (status = 404, description = "Unknown job", body = ErrorResponse),
        (status = 409, description = "Job is not pending", body = ErrorResponse)
    ),
    security(("callbackToken" = []))
)]
async fn mark_processing(
    State(state): State<AppState>,
    JobIdPath(job_id): JobIdPath,
) -> AppResult<Json<JobResponse>> {
    let job = state.services.jobs.mark_processing(job_id).await?;
    Ok(Json(JobResponse::from(job)))
}

/// POST /internal/jobs/{id}/complete - Generation succeeded
#[utoipa::path(
    post,
    path = "/{id}/complete",
    tag = CALLBACK_TAG,
    params(("id" = String, Path, description = "Job id")),
    request_body = CompleteJobRequest,
    responses(
        (status = 200, description = "Job completed", body = JobResponse),
        (status = 404, description = "Unknown job", body = ErrorResponse),
        (status = 409, description = "Job already finished", body = ErrorResponse)
    ),
    security(("callbackToken" = []))
)]
async fn complete_job(
    State(state): State<AppState>,
    JobIdPath(job_id): JobIdPath,
    ValidatedJson(req): ValidatedJson<CompleteJobRequest>,
) -> AppResult<Json<JobResponse>> {
    let job = state.services.jobs.complete(job_id, &req.result_ref).await?;
    Ok(Json(JobResponse::from(job)))
}

/// POST /internal/jobs/{id}/fail - Generation failed
#[utoipa::path(
    post,
    path = "/{id}/fail",
    tag = CALLBACK_TAG,
    params(("id" = String, Path, description = "Job id")),
    request_body = FailJobRequest,
    responses(
        (status = 200, description = "Job failed", body = JobResponse),
        (status = 404, description = "Unknown job", body = ErrorResponse),
        (status = 409, description = "Job already finished", body = ErrorResponse)
    ),
    security(("callbackToken" = []))
)]
async fn fail_job(
    State(state): State<AppState>,
    JobIdPath(job_id): JobIdPath,
    ValidatedJson(req): ValidatedJson<FailJobRequest>,
) -> AppResult<Json<JobResponse>> {
    let job = state
        .services
        .jobs
        .fail(job_id, &req.message, req.code)
        .await?;
    Ok(Json(JobResponse::from(job)))
}
