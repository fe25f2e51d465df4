//! Database access.
//!
//! Async PostgreSQL connection pooling with diesel_async and bb8, plus the
//! embedded migrations for the job table.

mod migrations;
mod pool;

pub use migrations::{MIGRATIONS, pending_migrations, revert_migrations, run_pending_migrations};
pub use pool::{AsyncDbPool, establish_async_connection_pool};
