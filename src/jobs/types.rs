use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Failure code recorded when the broker could not accept a job.
pub const QUEUE_ERROR: &str = "QUEUE_ERROR";

/// Failure code recorded when a worker reports a failure without its own code.
pub const GENERATION_ERROR: &str = "GENERATION_ERROR";

/// Message recorded alongside [`QUEUE_ERROR`].
pub const QUEUE_ERROR_MESSAGE: &str = "Failed to queue job for processing";

/// Column limits of `generation_jobs`, in characters.
pub const MAX_OWNER_ID_LEN: usize = 255;
pub const MAX_RESULT_REF_LEN: usize = 255;
pub const MAX_ERROR_CODE_LEN: usize = 50;

/// Opaque job identifier, a random v4 UUID assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for JobId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<JobId> for Uuid {
    fn from(value: JobId) -> Self {
        value.0
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::GenerationJobStatus")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Completed, Failed and Cancelled admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// Pending may skip Processing because a worker can report completion or
    /// failure without marking the job first.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Processing | Completed | Failed | Cancelled)
                | (Processing, Completed | Failed | Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error details of a failed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub message: String,
    pub code: String,
}

impl JobFailure {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Failure recorded when the job could not be handed to the broker.
    pub fn queue_error() -> Self {
        Self::new(QUEUE_ERROR_MESSAGE, QUEUE_ERROR)
    }

    /// Worker-reported failure, falling back to [`GENERATION_ERROR`].
    pub fn generation(message: impl Into<String>, code: Option<String>) -> Self {
        let code = code
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| GENERATION_ERROR.to_string());
        Self::new(message, code)
    }
}

/// Lifecycle state together with the data only valid in that state.
///
/// A result reference exists only for `Completed` and failure details only
/// for `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Processing,
    Completed { result_ref: String },
    Failed(JobFailure),
    Cancelled,
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Pending => JobStatus::Pending,
            JobState::Processing => JobStatus::Processing,
            JobState::Completed { .. } => JobStatus::Completed,
            JobState::Failed(_) => JobStatus::Failed,
            JobState::Cancelled => JobStatus::Cancelled,
        }
    }

    pub fn result_ref(&self) -> Option<&str> {
        match self {
            JobState::Completed { result_ref } => Some(result_ref),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        match self {
            JobState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
