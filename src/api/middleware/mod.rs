//! Middleware components for request processing.

mod callback_auth;
mod error_handler;
mod logging;
mod request_id;

pub use callback_auth::{CALLBACK_TOKEN_HEADER, callback_auth_middleware};
pub use logging::logging_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
