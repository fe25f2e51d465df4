//! The job entity and its state machine.

use jiff::Timestamp;

use crate::error::{AppError, AppResult};
use crate::jobs::payload::JobPayload;
use crate::jobs::types::{JobFailure, JobId, JobState, JobStatus};

/// Current time truncated to the microsecond precision Postgres stores.
fn now() -> Timestamp {
    let now = Timestamp::now();
    Timestamp::from_microsecond(now.as_microsecond()).unwrap_or(now)
}

/// A persisted generation request and its lifecycle.
///
/// Identity, owner and payload are fixed at creation. The state only moves
/// through the transition methods, which enforce the status graph and keep
/// `updated_at` from moving backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: JobId,
    owner_id: String,
    payload: JobPayload,
    state: JobState,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Job {
    /// A fresh `Pending` job with a newly assigned id.
    pub fn new(owner_id: impl Into<String>, payload: JobPayload) -> Self {
        let created_at = now();
        Self {
            id: JobId::new(),
            owner_id: owner_id.into(),
            payload,
            state: JobState::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    /// Rebuild a job from stored fields.
    pub fn restore(
        id: JobId,
        owner_id: String,
        payload: JobPayload,
        state: JobState,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner_id,
            payload,
            state,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn payload(&self) -> &JobPayload {
        &self.payload
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn result_ref(&self) -> Option<&str> {
        self.state.result_ref()
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        self.state.failure()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }

    /// `Pending -> Processing`
    pub fn mark_processing(&mut self) -> AppResult<()> {
        self.transition(JobState::Processing)
    }

    /// Move to `Completed` with the produced artifact reference.
    pub fn complete(&mut self, result_ref: impl Into<String>) -> AppResult<()> {
        self.transition(JobState::Completed {
            result_ref: result_ref.into(),
        })
    }

    /// Move to `Failed` with the given details.
    pub fn fail(&mut self, failure: JobFailure) -> AppResult<()> {
        self.transition(JobState::Failed(failure))
    }

    /// Move to `Cancelled`.
    pub fn cancel(&mut self) -> AppResult<()> {
        self.transition(JobState::Cancelled)
    }

    fn transition(&mut self, next: JobState) -> AppResult<()> {
        let from = self.status();
        let to = next.status();
        if !from.can_transition_to(to) {
            return Err(AppError::InvalidTransition {
                job_id: self.id,
                from,
                to,
            });
        }

        self.state = next;
        self.updated_at = now().max(self.updated_at);
        Ok(())
    }
}
