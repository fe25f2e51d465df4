//! In-process job store.
//!
//! Nothing survives a restart. Used for local development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::jobs::{Job, JobId, JobStatus};
use crate::repositories::JobStore;

struct Entry {
    job: Job,
    /// Insertion order, breaks ties between equal `created_at` values
    seq: u64,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, Entry>,
    next_seq: u64,
}

/// Job store backed by a `HashMap` behind an async `RwLock`.
///
/// Every write takes the write lock, which serialises conflicting updates to
/// the same id.
#[derive(Default)]
pub struct MemoryJobStore {
    inner: RwLock<Inner>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: &Job) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.jobs.contains_key(&job.id()) {
            return Err(AppError::Duplicate {
                entity: "job".to_string(),
                field: "id".to_string(),
                value: job.id().to_string(),
            });
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(
            job.id(),
            Entry {
                job: job.clone(),
                seq,
            },
        );
        Ok(())
    }

    async fn get(&self, id: JobId, owner_id: &str) -> AppResult<Job> {
        let inner = self.inner.read().await;
        inner
            .jobs
            .get(&id)
            .filter(|entry| entry.job.is_owned_by(owner_id))
            .map(|entry| entry.job.clone())
            .ok_or_else(|| AppError::job_not_found(&id))
    }

    async fn find(&self, id: JobId) -> AppResult<Job> {
        let inner = self.inner.read().await;
        inner
            .jobs
            .get(&id)
            .map(|entry| entry.job.clone())
            .ok_or_else(|| AppError::job_not_found(&id))
    }

    async fn update(&self, job: &Job) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .jobs
            .get_mut(&job.id())
            .ok_or_else(|| AppError::job_not_found(&job.id()))?;
        entry.job = job.clone();
        Ok(())
    }

    async fn update_if_status(&self, job: &Job, expected: JobStatus) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .jobs
            .get_mut(&job.id())
            .ok_or_else(|| AppError::job_not_found(&job.id()))?;

        if entry.job.status() != expected {
            return Err(AppError::Conflict {
                message: format!("job {} is no longer {}", job.id(), expected),
            });
        }
        entry.job = job.clone();
        Ok(())
    }

    async fn list(&self, owner_id: &str) -> AppResult<Vec<Job>> {
        let inner = self.inner.read().await;
        let mut entries: Vec<&Entry> = inner
            .jobs
            .values()
            .filter(|entry| entry.job.is_owned_by(owner_id))
            .collect();

        entries.sort_by(|a, b| {
            b.job
                .created_at()
                .cmp(&a.job.created_at())
                .then(b.seq.cmp(&a.seq))
        });

        Ok(entries.into_iter().map(|entry| entry.job.clone()).collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
