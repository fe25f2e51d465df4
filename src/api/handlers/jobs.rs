//! Job submission and polling handlers.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::JOB_TAG;
use crate::api::dto::{ErrorResponse, JobResponse, SubmitJobRequest, SubmitJobResponse};
use crate::api::extract::{JobIdPath, OwnerId};
use crate::error::AppResult;
use crate::jobs::JobStatus;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates job routes, nested under `/api/jobs`.
pub fn job_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_jobs, submit_job))
        .routes(routes!(get_job))
        .routes(routes!(cancel_job))
}

/// POST /api/jobs - Submit a generation job
///
/// The job is persisted and queued before the response is sent; the work
/// itself happens asynchronously. Poll `GET /api/jobs/{id}` for the outcome.
#[utoipa::path(
    post,
    path = "/",
    tag = JOB_TAG,
    params(("x-user-id" = String, Header, description = "Caller id set by the gateway")),
    request_body = SubmitJobRequest,
    responses(
        (status = 202, description = "Job accepted", body = SubmitJobResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Missing caller id", body = ErrorResponse),
        (status = 503, description = "Job persisted but could not be queued", body = ErrorResponse)
    )
)]
async fn submit_job(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    ValidatedJson(req): ValidatedJson<SubmitJobRequest>,
) -> AppResult<(StatusCode, Json<SubmitJobResponse>)> {
    let job_id = state.services.jobs.submit(&owner_id, req.into_payload()).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            job_id,
            status: JobStatus::Pending,
        }),
    ))
}

/// GET /api/jobs - List the caller's jobs, newest first
#[utoipa::path(
    get,
    path = "/",
    tag = JOB_TAG,
    params(("x-user-id" = String, Header, description = "Caller id set by the gateway")),
    responses(
        (status = 200, description = "Jobs of the caller", body = Vec<JobResponse>),
        (status = 401, description = "Missing caller id", body = ErrorResponse)
    )
)]
async fn list_jobs(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> AppResult<Json<Vec<JobResponse>>> {
    let jobs = state.services.jobs.list(&owner_id).await?;
    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}

/// GET /api/jobs/{id} - Get one of the caller's jobs
#[utoipa::path(
    get,
    path = "/{id}",
    tag = JOB_TAG,
    params(
        ("id" = String, Path, description = "Job id"),
        ("x-user-id" = String, Header, description = "Caller id set by the gateway")
    ),
    responses(
        (status = 200, description = "Job found", body = JobResponse),
        (status = 404, description = "Unknown job or owned by someone else", body = ErrorResponse)
    )
)]
async fn get_job(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    JobIdPath(job_id): JobIdPath,
) -> AppResult<Json<JobResponse>> {
    let job = state.services.jobs.get_status(job_id, &owner_id).await?;
    Ok(Json(JobResponse::from(job)))
}

/// POST /api/jobs/{id}/cancel - Cancel a pending or processing job
#[utoipa::path(
    post,
    path = "/{id}/cancel",
    tag = JOB_TAG,
    params(
        ("id" = String, Path, description = "Job id"),
        ("x-user-id" = String, Header, description = "Caller id set by the gateway")
    ),
    responses(
        (status = 200, description = "Job cancelled", body = JobResponse),
        (status = 404, description = "Unknown job or owned by someone else", body = ErrorResponse),
        (status = 409, description = "Job already finished", body = ErrorResponse)
    )
)]
async fn cancel_job(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    JobIdPath(job_id): JobIdPath,
) -> AppResult<Json<JobResponse>> {
    let job = state.services.jobs.cancel(job_id, &owner_id).await?;
    Ok(Json(JobResponse::from(job)))
}
