//! Publisher selection at startup.

use std::sync::Arc;

use tracing::{info, warn};

use crate::broker::{BrokerConnection, BrokerError, JobPublisher, NoOpPublisher, RedisStreamsPublisher};
use crate::config::BrokerConfig;

/// Connect to the configured broker and declare its topology.
pub async fn connect_publisher(config: &BrokerConfig) -> Result<RedisStreamsPublisher, BrokerError> {
    let connection = BrokerConnection::connect(&config.url, config.connection_timeout()).await?;
    RedisStreamsPublisher::new(connection, config).await
}

/// Build the process-wide publisher.
///
/// Never fails: when the broker is disabled or cannot be reached the
/// NoOp publisher is installed and the service runs degraded.
pub async fn init_publisher(config: &BrokerConfig) -> Arc<dyn JobPublisher> {
    if !config.enabled {
        warn!("Broker disabled; submitted jobs will not be delivered to workers");
        return Arc::new(NoOpPublisher::new());
    }

    match connect_publisher(config).await {
        Ok(publisher) => {
            info!(stream = %publisher.stream_key(), group = %config.queue, "Broker publisher ready");
            Arc::new(publisher)
        }
        Err(e) => {
            warn!(
                error = %e,
                url = %config.url,
                "Broker unreachable at startup, falling back to degraded mode"
            );
            Arc::new(NoOpPublisher::new())
        }
    }
}
