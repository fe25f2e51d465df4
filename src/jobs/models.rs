use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::AppError;
use crate::jobs::job::Job;
use crate::jobs::payload::{JobMetadata, JobPayload};
use crate::jobs::types::{JobFailure, JobState, JobStatus};
use crate::schema::generation_jobs;

/// Row of the `generation_jobs` table.
///
/// Used for SELECT, INSERT and full-record UPDATE. `None` fields are written
/// as NULL so clearing a result or error actually clears the column.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = generation_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct GenerationJobRow {
    pub id: Uuid,
    pub owner_id: String,
    pub description: String,
    pub metadata: JsonValue,
    pub status: JobStatus,
    pub result_ref: Option<String>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<&Job> for GenerationJobRow {
    type Error = AppError;

    fn try_from(job: &Job) -> Result<Self, Self::Error> {
        let metadata = job
            .payload()
            .metadata
            .to_value()
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e).context("serialize job metadata"),
            })?;
        let failure = job.failure();

        Ok(Self {
            id: job.id().into(),
            owner_id: job.owner_id().to_string(),
            description: job.payload().description.clone(),
            metadata,
            status: job.status(),
            result_ref: job.result_ref().map(str::to_string),
            error_message: failure.map(|f| f.message.clone()),
            error_code: failure.map(|f| f.code.clone()),
            created_at: Timestamp::from(job.created_at()),
            updated_at: Timestamp::from(job.updated_at()),
        })
    }
}

impl TryFrom<GenerationJobRow> for Job {
    type Error = AppError;

    /// Fails on rows whose columns contradict their status, e.g. a completed
    /// job without a result reference.
    fn try_from(row: GenerationJobRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: &str| AppError::Internal {
            source: anyhow::anyhow!("corrupt job row {}: {}", row.id, reason),
        };

        let state = match row.status {
            JobStatus::Pending => JobState::Pending,
            JobStatus::Processing => JobState::Processing,
            JobStatus::Cancelled => JobState::Cancelled,
            JobStatus::Completed => JobState::Completed {
                result_ref: row
                    .result_ref
                    .clone()
                    .ok_or_else(|| corrupt("completed without result_ref"))?,
            },
            JobStatus::Failed => JobState::Failed(JobFailure {
                message: row.error_message.clone().unwrap_or_default(),
                code: row
                    .error_code
                    .clone()
                    .ok_or_else(|| corrupt("failed without error_code"))?,
            }),
        };

        let metadata = JobMetadata::from_value(row.metadata.clone())
            .map_err(|e| corrupt(&format!("metadata: {e}")))?;

        Ok(Job::restore(
            row.id.into(),
            row.owner_id,
            JobPayload::new(row.description, metadata),
            state,
            row.created_at.to_jiff(),
            row.updated_at.to_jiff(),
        ))
    }
}
