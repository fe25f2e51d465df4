//! Broker error types.

use thiserror::Error;

/// Errors raised while talking to the message broker.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Broker connection failed: {0}")]
    Connection(String),

    #[error("Broker topology declaration failed: {0}")]
    Topology(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Broker operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Broker connection is closed")]
    Unavailable,
}

impl From<serde_json::Error> for BrokerError {
    fn from(err: serde_json::Error) -> Self {
        BrokerError::Serialization(err.to_string())
    }
}
