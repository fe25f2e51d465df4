//! Message broker integration.
//!
//! Submitted jobs are handed to the worker pool as `WorkItem`s through a
//! `JobPublisher`. The production publisher appends to a Redis stream; the
//! NoOp publisher stands in when the broker is disabled or down at boot.

mod connection;
mod error;
mod manager;
mod noop;
mod redis_streams;
mod traits;

pub use connection::BrokerConnection;
pub use error::BrokerError;
pub use manager::{connect_publisher, init_publisher};
pub use noop::NoOpPublisher;
pub use redis_streams::RedisStreamsPublisher;
pub use traits::JobPublisher;
