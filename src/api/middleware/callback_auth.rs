//! Shared-secret guard for worker callback routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the worker's shared secret.
pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

/// Rejects callback requests whose `x-callback-token` does not match
/// `callbacks.token`. Without a configured token every request passes.
pub async fn callback_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.callbacks.token.as_deref() {
        let provided = request
            .headers()
            .get(CALLBACK_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing callback token".to_string(),
            })?;

        if provided != expected {
            return Err(AppError::Unauthorized {
                message: "Invalid callback token".to_string(),
            });
        }
    }

    Ok(next.run(request).await)
}
