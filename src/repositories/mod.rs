//! Job persistence.
//!
//! `JobStore` is the seam between the service layer and storage. Two
//! backends implement it: PostgreSQL through the diesel-async pool and an
//! in-process map for development and tests.

mod memory_job_store;
mod pg_job_store;
mod traits;

pub use memory_job_store::MemoryJobStore;
pub use pg_job_store::PgJobStore;
pub use traits::JobStore;
