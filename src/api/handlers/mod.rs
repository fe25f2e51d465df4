//! HTTP request handlers, one module per resource.

pub mod callbacks;
pub mod health;
pub mod jobs;
