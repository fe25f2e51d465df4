//! NoOp publisher.
//!
//! Installed when the broker is disabled or unreachable at startup. Every
//! publish succeeds and the item is dropped with a warning.

use async_trait::async_trait;
use tracing::warn;

use crate::broker::{BrokerError, JobPublisher};
use crate::jobs::WorkItem;

/// A publisher that accepts everything and delivers nothing.
pub struct NoOpPublisher;

impl NoOpPublisher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobPublisher for NoOpPublisher {
    async fn publish(&self, item: &WorkItem) -> Result<(), BrokerError> {
        warn!(
            job_id = %item.job_id,
            owner_id = %item.owner_id,
            "Broker unavailable, work item dropped; job will stay pending"
        );
        Ok(())
    }

    fn is_degraded(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "noop"
    }
}
