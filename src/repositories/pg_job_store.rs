use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::jobs::{GenerationJobRow, Job, JobId, JobStatus};
use crate::repositories::JobStore;
use crate::schema::generation_jobs;

/// PostgreSQL job store on the shared diesel-async pool.
#[derive(Clone)]
pub struct PgJobStore {
    pool: AsyncDbPool,
}

impl PgJobStore {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> AppResult<PooledConnection<'_, AsyncPgConnection>> {
        self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })
    }
}

fn not_found_or(id: JobId, operation: &str) -> impl FnOnce(diesel::result::Error) -> AppError {
    move |e| match e {
        diesel::result::Error::NotFound => AppError::job_not_found(&id),
        other => DatabaseErrorConverter::convert_diesel_error(other, operation),
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job: &Job) -> AppResult<()> {
        let row = GenerationJobRow::try_from(job)?;
        let mut conn = self.connection().await?;

        diesel::insert_into(generation_jobs::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "insert job"))?;

        Ok(())
    }

    async fn get(&self, id: JobId, owner_id: &str) -> AppResult<Job> {
        let mut conn = self.connection().await?;

        let row = generation_jobs::table
            .find(*id.as_uuid())
            .filter(generation_jobs::owner_id.eq(owner_id))
            .select(GenerationJobRow::as_select())
            .first(&mut conn)
            .await
            .map_err(not_found_or(id, "get job"))?;

        Job::try_from(row)
    }

    async fn find(&self, id: JobId) -> AppResult<Job> {
        let mut conn = self.connection().await?;

        let row = generation_jobs::table
            .find(*id.as_uuid())
            .select(GenerationJobRow::as_select())
            .first(&mut conn)
            .await
            .map_err(not_found_or(id, "find job"))?;

        Job::try_from(row)
    }

    async fn update(&self, job: &Job) -> AppResult<()> {
        let row = GenerationJobRow::try_from(job)?;
        let mut conn = self.connection().await?;

        let affected = diesel::update(generation_jobs::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "update job"))?;

        if affected == 0 {
            return Err(AppError::job_not_found(&job.id()));
        }
        Ok(())
    }

    async fn update_if_status(&self, job: &Job, expected: JobStatus) -> AppResult<()> {
        let row = GenerationJobRow::try_from(job)?;
        let mut conn = self.connection().await?;

        // The row lock taken by UPDATE serialises concurrent writers; the
        // status predicate is re-checked after the lock is acquired.
        let affected = diesel::update(
            generation_jobs::table
                .filter(generation_jobs::id.eq(row.id))
                .filter(generation_jobs::status.eq(expected)),
        )
        .set(&row)
        .execute(&mut conn)
        .await
        .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "update job status"))?;

        if affected > 0 {
            return Ok(());
        }

        let exists: bool = diesel::select(diesel::dsl::exists(generation_jobs::table.find(row.id)))
            .get_result(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "check job"))?;

        if exists {
            Err(AppError::Conflict {
                message: format!("job {} is no longer {}", job.id(), expected),
            })
        } else {
            Err(AppError::job_not_found(&job.id()))
        }
    }

    async fn list(&self, owner_id: &str) -> AppResult<Vec<Job>> {
        let mut conn = self.connection().await?;

        let rows = generation_jobs::table
            .filter(generation_jobs::owner_id.eq(owner_id))
            .order((generation_jobs::created_at.desc(), generation_jobs::id.desc()))
            .select(GenerationJobRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list jobs"))?;

        rows.into_iter().map(Job::try_from).collect()
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;

        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "ping"))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
