//! Genflow library
//!
//! Asynchronous generation job service: HTTP intake, durable job store,
//! Redis stream hand-off to workers and worker result callbacks.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod broker;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod logger;
pub mod repositories;
pub mod schema;
pub mod server;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
