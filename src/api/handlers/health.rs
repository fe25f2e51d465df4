//! Health check handlers.
//!
//! `/health` reports every component, `/health/ready` gates traffic on the
//! job store and `/health/live` only proves the process responds. A NoOp
//! publisher makes the service `degraded`, not unready: requests are still
//! served, but submitted jobs are never delivered.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = BTreeMap::new();
    checks.insert("store".to_string(), check_store(&state).await);
    checks.insert("broker".to_string(), check_broker(&state));

    let response = HealthResponse::from_checks(checks);
    let status = match response.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    (status, Json(response))
}

#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Job store unreachable")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_store(&state).await.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    }
}

#[utoipa::path(
    get,
    path = "/health/live",
    responses((status = 200, description = "Service is alive")),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_store(state: &AppState) -> ComponentHealth {
    let store = state.services.jobs.store();
    let start = Instant::now();

    let (status, message) = match store.ping().await {
        Ok(()) => (
            HealthStatus::Healthy,
            format!("{} reachable", store.backend_name()),
        ),
        Err(e) => (
            HealthStatus::Unhealthy,
            format!("{} unreachable: {}", store.backend_name(), e),
        ),
    };

    ComponentHealth {
        status,
        message: Some(message),
        response_time_ms: Some(start.elapsed().as_millis() as u64),
    }
}

fn check_broker(state: &AppState) -> ComponentHealth {
    let publisher = state.services.jobs.publisher();

    if publisher.is_degraded() {
        ComponentHealth {
            status: HealthStatus::Degraded,
            message: Some("no-op publisher installed, jobs are not delivered".to_string()),
            response_time_ms: None,
        }
    } else {
        ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some(format!("{} publisher", publisher.backend_name())),
            response_time_ms: None,
        }
    }
}
