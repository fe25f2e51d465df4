//! Request extractors for the caller principal and job ids.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::jobs::JobId;

/// Header set by the authenticating gateway with the caller's id.
pub const OWNER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, as asserted by the upstream gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerId(pub String);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| OwnerId(v.to_string()))
            .ok_or_else(|| AppError::Unauthorized {
                message: format!("Missing {} header", OWNER_ID_HEADER),
            })
    }
}

/// A `{id}` path segment parsed as a job id.
#[derive(Debug, Clone, Copy)]
pub struct JobIdPath(pub JobId);

impl<S> FromRequestParts<S> for JobIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest {
                message: e.body_text(),
            })?;

        raw.parse::<JobId>()
            .map(JobIdPath)
            .map_err(|_| AppError::Validation {
                field: "id".to_string(),
                reason: format!("'{}' is not a valid job id", raw),
            })
    }
}
