//! Job orchestration.
//!
//! Persists generation requests, hands them to the broker and applies the
//! worker callbacks that close each job's lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use validator::Validate;

use crate::broker::{BrokerError, JobPublisher};
use crate::error::{AppError, AppResult};
use crate::jobs::{
    Job, JobFailure, JobId, JobPayload, MAX_ERROR_CODE_LEN, MAX_OWNER_ID_LEN, MAX_RESULT_REF_LEN,
    WorkItem,
};
use crate::repositories::JobStore;

/// Job service coordinating the store and the publisher.
///
/// Holds no mutable state of its own. Both collaborators are shared,
/// long-lived resources, so cloning only bumps reference counts.
#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn JobStore>,
    publisher: Arc<dyn JobPublisher>,
    publish_timeout: Duration,
}

impl JobService {
    pub fn new(
        store: Arc<dyn JobStore>,
        publisher: Arc<dyn JobPublisher>,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            store,
            publisher,
            publish_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn publisher(&self) -> &Arc<dyn JobPublisher> {
        &self.publisher
    }

    /// Persist a new job and queue it for a worker.
    ///
    /// The owner and payload are validated before anything is written. When
    /// the publish fails the job is not left pending: it is moved to `Failed`
    /// with code `QUEUE_ERROR` and `AppError::Publish` is returned. The failed
    /// record stays in the store for auditing.
    ///
    /// Persisting, publishing and the failure bookkeeping run on their own
    /// task, so they finish even if the caller's future is dropped halfway.
    pub async fn submit(&self, owner_id: &str, payload: JobPayload) -> AppResult<JobId> {
        if owner_id.trim().is_empty() {
            return Err(AppError::Validation {
                field: "ownerId".to_string(),
                reason: "Owner id must not be empty".to_string(),
            });
        }
        check_len("ownerId", owner_id, MAX_OWNER_ID_LEN)?;
        payload.validate()?;

        let job = Job::new(owner_id, payload);
        let job_id = job.id();

        let service = self.clone();
        tokio::spawn(async move { service.persist_and_enqueue(job).await })
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e).context("submit task aborted"),
            })??;

        if self.publisher.is_degraded() {
            warn!(job_id = %job_id, owner_id = %owner_id, "Job accepted in degraded mode");
        } else {
            info!(job_id = %job_id, owner_id = %owner_id, "Job submitted");
        }
        Ok(job_id)
    }

    async fn persist_and_enqueue(&self, job: Job) -> AppResult<()> {
        let job_id = job.id();
        self.store.create(&job).await?;

        if let Err(source) = self.publish(&WorkItem::from(&job)).await {
            error!(
                job_id = %job_id,
                owner_id = %job.owner_id(),
                error = %source,
                "Failed to queue job"
            );
            self.fail_unqueued(job).await;
            return Err(AppError::Publish { job_id, source });
        }
        Ok(())
    }

    async fn publish(&self, item: &WorkItem) -> Result<(), BrokerError> {
        tokio::time::timeout(self.publish_timeout, self.publisher.publish(item))
            .await
            .map_err(|_| BrokerError::Timeout(self.publish_timeout))?
    }

    /// Record a publish failure on a job that is still pending.
    ///
    /// A timed-out publish may still have reached the broker, so a worker can
    /// already own the job. The conditional write keeps its progress intact.
    async fn fail_unqueued(&self, mut job: Job) {
        let job_id = job.id();
        let expected = job.status();
        if let Err(e) = job.fail(JobFailure::queue_error()) {
            error!(job_id = %job_id, error = %e, "Cannot mark unqueued job as failed");
            return;
        }

        match self.store.update_if_status(&job, expected).await {
            Ok(()) => info!(job_id = %job_id, "Unqueued job marked failed"),
            Err(AppError::Conflict { .. }) => {
                warn!(job_id = %job_id, "Unqueued job was already picked up by a worker")
            }
            Err(e) => error!(job_id = %job_id, error = %e, "Failed to record queue error"),
        }
    }

    /// Owner-scoped lookup. Unknown and foreign ids are both `NotFound`.
    pub async fn get_status(&self, job_id: JobId, owner_id: &str) -> AppResult<Job> {
        self.store.get(job_id, owner_id).await
    }

    /// Jobs of one owner, most recent first.
    pub async fn list(&self, owner_id: &str) -> AppResult<Vec<Job>> {
        self.store.list(owner_id).await
    }

    /// Worker callback: the job has been picked up.
    pub async fn mark_processing(&self, job_id: JobId) -> AppResult<Job> {
        let job = self.store.find(job_id).await?;
        let job = self.transition(job, Job::mark_processing).await?;
        info!(job_id = %job_id, "Job processing");
        Ok(job)
    }

    /// Worker callback: generation succeeded.
    pub async fn complete(&self, job_id: JobId, result_ref: &str) -> AppResult<Job> {
        if result_ref.trim().is_empty() {
            return Err(AppError::Validation {
                field: "resultRef".to_string(),
                reason: "Result reference must not be empty".to_string(),
            });
        }
        check_len("resultRef", result_ref, MAX_RESULT_REF_LEN)?;

        let job = self.store.find(job_id).await?;
        let job = self
            .transition(job, |job| job.complete(result_ref))
            .await?;
        info!(job_id = %job_id, result_ref = %result_ref, "Job completed");
        Ok(job)
    }

    /// Worker callback: generation failed.
    ///
    /// A missing or blank `code` is recorded as `GENERATION_ERROR`.
    pub async fn fail(
        &self,
        job_id: JobId,
        message: &str,
        code: Option<String>,
    ) -> AppResult<Job> {
        if let Some(code) = code.as_deref() {
            check_len("code", code, MAX_ERROR_CODE_LEN)?;
        }
        let failure = JobFailure::generation(message, code);
        let job = self.store.find(job_id).await?;
        let job = self
            .transition(job, |job| job.fail(failure.clone()))
            .await?;
        warn!(
            job_id = %job_id,
            code = %failure.code,
            message = %failure.message,
            "Job failed"
        );
        Ok(job)
    }

    /// Cancel a job that has not reached a terminal state.
    pub async fn cancel(&self, job_id: JobId, owner_id: &str) -> AppResult<Job> {
        let job = self.store.get(job_id, owner_id).await?;
        let job = self.transition(job, Job::cancel).await?;
        info!(job_id = %job_id, owner_id = %owner_id, "Job cancelled");
        Ok(job)
    }

    /// Apply a state change and persist it only if nobody else moved the job
    /// in the meantime.
    async fn transition<F>(&self, mut job: Job, apply: F) -> AppResult<Job>
    where
        F: FnOnce(&mut Job) -> AppResult<()>,
    {
        let expected = job.status();
        apply(&mut job)?;
        self.store.update_if_status(&job, expected).await?;
        Ok(job)
    }
}

fn check_len(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::Validation {
            field: field.to_string(),
            reason: format!("Must be at most {max} characters"),
        });
    }
    Ok(())
}
