use serde::{Deserialize, Serialize};

use crate::jobs::job::Job;
use crate::jobs::payload::JobMetadata;
use crate::jobs::types::JobId;

/// Message handed to the worker pool.
///
/// A snapshot of the job at publish time; later state lives only in the job
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub job_id: JobId,
    pub owner_id: String,
    pub description: String,
    pub metadata: JobMetadata,
}

impl From<&Job> for WorkItem {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id(),
            owner_id: job.owner_id().to_string(),
            description: job.payload().description.clone(),
            metadata: job.payload().metadata.clone(),
        }
    }
}
