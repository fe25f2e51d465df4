//! JobStore trait definition.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::jobs::{Job, JobId, JobStatus};

/// Durable storage for job records.
///
/// Reads that take an owner are scoped to that owner: a job belonging to
/// someone else is reported as `NotFound`, exactly like an unknown id.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job. Fails with `Duplicate` if the id already exists.
    async fn create(&self, job: &Job) -> AppResult<()>;

    /// Owner-scoped lookup.
    async fn get(&self, id: JobId, owner_id: &str) -> AppResult<Job>;

    /// Unscoped lookup for worker callbacks, which carry no principal.
    async fn find(&self, id: JobId) -> AppResult<Job>;

    /// Full-record replace. Fails with `NotFound` if the id is unknown.
    async fn update(&self, job: &Job) -> AppResult<()>;

    /// Full-record replace applied only while the stored status equals
    /// `expected`.
    ///
    /// Fails with `NotFound` for an unknown id and with `Conflict` when another
    /// writer already moved the job on. Of two racing transitions from the
    /// same status exactly one succeeds.
    async fn update_if_status(&self, job: &Job, expected: JobStatus) -> AppResult<()>;

    /// All jobs of one owner, newest first.
    async fn list(&self, owner_id: &str) -> AppResult<Vec<Job>>;

    /// Cheap reachability check behind `/health/ready`.
    async fn ping(&self) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}
