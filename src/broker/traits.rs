//! Publisher trait definition.

use async_trait::async_trait;

use crate::broker::BrokerError;
use crate::jobs::WorkItem;

/// Hands work items to the worker pool.
#[async_trait]
pub trait JobPublisher: Send + Sync {
    /// Enqueue one item for durable delivery.
    async fn publish(&self, item: &WorkItem) -> Result<(), BrokerError>;

    /// True when items are accepted but never delivered.
    fn is_degraded(&self) -> bool {
        false
    }

    /// Release the broker connection. Later publishes fail.
    async fn close(&self) {}

    fn backend_name(&self) -> &'static str;
}
