//! Data Transfer Objects for API requests and responses.

mod error;
mod health;
mod job;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use job::{
    CompleteJobRequest, FailJobRequest, JobResponse, SubmitJobRequest, SubmitJobResponse,
};
