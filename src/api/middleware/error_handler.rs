//! Conversion of `AppError` into HTTP responses.
//!
//! Every error leaves the API as an `ErrorResponse` with a stable `code`.
//! Infrastructure failures are logged here and reported without internals.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::api::dto::ErrorResponse;
use crate::error::AppError;
use crate::jobs::QUEUE_ERROR;

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Duplicate { .. }
            | AppError::InvalidTransition { .. }
            | AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Validation { .. }
            | AppError::ValidationErrors { .. }
            | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Publish { .. } | AppError::ConnectionPool { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Database { .. }
            | AppError::Configuration { .. }
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        match self {
            AppError::NotFound { entity, field, value } => ErrorResponse::new(
                "NOT_FOUND",
                format!("{} with {} '{}' not found", entity, field, value),
            ),
            AppError::Duplicate { entity, field, value } => ErrorResponse::new(
                "DUPLICATE",
                format!("{} with {} '{}' already exists", entity, field, value),
            ),
            AppError::Validation { field, reason } => {
                ErrorResponse::new("VALIDATION_ERROR", reason.clone())
                    .with_details(json!({ "field": field }))
            }
            AppError::ValidationErrors { errors } => {
                let fields: Vec<_> = errors
                    .iter()
                    .map(|e| json!({ "field": e.field, "message": e.message }))
                    .collect();
                ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(json!({ "errors": fields }))
            }
            AppError::BadRequest { message } => ErrorResponse::new("BAD_REQUEST", message.clone()),
            AppError::Unauthorized { message } => {
                ErrorResponse::new("UNAUTHORIZED", message.clone())
            }
            AppError::InvalidTransition { job_id, from, to } => ErrorResponse::new(
                "INVALID_TRANSITION",
                format!("job cannot move from {} to {}", from, to),
            )
            .with_details(json!({ "jobId": job_id, "from": from, "to": to })),
            AppError::Conflict { message } => ErrorResponse::new("CONFLICT", message.clone()),
            AppError::Publish { job_id, .. } => {
                ErrorResponse::new(QUEUE_ERROR, "Failed to queue job for processing")
                    .with_details(json!({ "jobId": job_id }))
            }
            AppError::Database { operation, .. } => ErrorResponse::new(
                "DATABASE_ERROR",
                format!("Database operation failed: {}", operation),
            ),
            AppError::Configuration { key, .. } => {
                ErrorResponse::new("CONFIGURATION_ERROR", format!("Configuration error: {}", key))
            }
            AppError::ConnectionPool { .. } => {
                ErrorResponse::new("SERVICE_UNAVAILABLE", "Database connection unavailable")
            }
            AppError::Internal { .. } => {
                ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, status = %status.as_u16(), "Request failed");
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::BrokerError;
    use crate::jobs::{JobId, JobStatus};

    #[test]
    fn test_publish_error_is_queue_error() {
        let err = AppError::Publish {
            job_id: JobId::new(),
            source: BrokerError::Unavailable,
        };

        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_error_response().code, "QUEUE_ERROR");
    }

    #[test]
    fn test_state_conflicts_are_409() {
        let invalid = AppError::InvalidTransition {
            job_id: JobId::new(),
            from: JobStatus::Completed,
            to: JobStatus::Completed,
        };
        let lost_race = AppError::Conflict {
            message: "job is no longer pending".to_string(),
        };

        assert_eq!(invalid.status_code(), StatusCode::CONFLICT);
        assert_eq!(lost_race.status_code(), StatusCode::CONFLICT);

        let body = invalid.to_error_response();
        assert_eq!(body.code, "INVALID_TRANSITION");
        assert_eq!(body.details.unwrap()["from"], json!("completed"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal {
            source: anyhow::anyhow!("secret connection string"),
        };

        let body = err.to_error_response();
        assert_eq!(body.message, "An internal error occurred");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_not_found_response() {
        let err = AppError::job_not_found(&JobId::new());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_error_response().code, "NOT_FOUND");
    }
}
