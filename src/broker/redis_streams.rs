//! Redis Streams publisher.
//!
//! Work items are appended with `XADD` to the stream `{exchange}:{routing_key}`.
//! The durable queue is a consumer group on that stream, created with
//! `MKSTREAM` so the stream exists before the first publish. Workers read
//! with `XREADGROUP` and acknowledge with `XACK`; entries stay pending until
//! acknowledged, which gives at-least-once delivery.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::broker::{BrokerConnection, BrokerError, JobPublisher};
use crate::config::BrokerConfig;
use crate::jobs::WorkItem;

const CONTENT_TYPE: &str = "application/json";

/// Publisher that appends work items to a Redis stream.
pub struct RedisStreamsPublisher {
    connection: BrokerConnection,
    stream_key: String,
    group: String,
}

impl RedisStreamsPublisher {
    /// Wrap an open connection and declare the stream topology.
    ///
    /// Declaration is idempotent: an existing consumer group is left as is.
    pub async fn new(
        connection: BrokerConnection,
        config: &BrokerConfig,
    ) -> Result<Self, BrokerError> {
        let publisher = Self {
            connection,
            stream_key: config.stream_key(),
            group: config.queue.clone(),
        };
        publisher.declare_topology().await?;
        Ok(publisher)
    }

    pub fn stream_key(&self) -> &str {
        &self.stream_key
    }

    async fn declare_topology(&self) -> Result<(), BrokerError> {
        let result = self
            .connection
            .query::<()>(&group_create_command(&self.stream_key, &self.group))
            .await?;

        match result {
            Ok(()) => {
                info!(stream = %self.stream_key, group = %self.group, "Declared job stream and consumer group");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => {
                debug!(stream = %self.stream_key, group = %self.group, "Consumer group already exists");
                Ok(())
            }
            Err(e) => Err(BrokerError::Topology(e.to_string())),
        }
    }
}

fn group_create_command(stream_key: &str, group: &str) -> redis::Cmd {
    let mut cmd = redis::cmd("XGROUP");
    cmd.arg("CREATE")
        .arg(stream_key)
        .arg(group)
        .arg("0")
        .arg("MKSTREAM");
    cmd
}

fn xadd_command(stream_key: &str, item: &WorkItem) -> Result<redis::Cmd, BrokerError> {
    let payload = serde_json::to_string(item)?;

    let mut cmd = redis::cmd("XADD");
    cmd.arg(stream_key)
        .arg("*")
        .arg("job_id")
        .arg(item.job_id.to_string())
        .arg("content_type")
        .arg(CONTENT_TYPE)
        .arg("payload")
        .arg(payload);
    Ok(cmd)
}

#[async_trait]
impl JobPublisher for RedisStreamsPublisher {
    #[instrument(skip(self, item), fields(stream = %self.stream_key, job_id = %item.job_id), err)]
    async fn publish(&self, item: &WorkItem) -> Result<(), BrokerError> {
        let cmd = xadd_command(&self.stream_key, item)?;

        let entry_id: String = self
            .connection
            .query(&cmd)
            .await?
            .map_err(|e| BrokerError::Publish(format!("XADD failed: {}", e)))?;

        debug!(entry_id = %entry_id, "Work item appended");
        Ok(())
    }

    async fn close(&self) {
        self.connection.close().await;
        info!(stream = %self.stream_key, "Broker connection closed");
    }

    fn backend_name(&self) -> &'static str {
        "redis-streams"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{Job, JobMetadata, JobPayload};

    fn packed(cmd: &redis::Cmd) -> String {
        String::from_utf8_lossy(&cmd.get_packed_command()).into_owned()
    }

    #[test]
    fn test_group_create_is_idempotent_shape() {
        let text = packed(&group_create_command("woragis.tasks:resumes.generate", "resumes.queue"));

        assert!(text.contains("XGROUP"));
        assert!(text.contains("CREATE"));
        assert!(text.contains("woragis.tasks:resumes.generate"));
        assert!(text.contains("resumes.queue"));
        assert!(text.contains("MKSTREAM"));
    }

    #[test]
    fn test_xadd_carries_job_id_and_json_payload() {
        let job = Job::new("u1", JobPayload::new("Senior Go Engineer", JobMetadata::default()));
        let item = WorkItem::from(&job);

        let text = packed(&xadd_command("woragis.tasks:resumes.generate", &item).unwrap());

        assert!(text.contains("XADD"));
        assert!(text.contains("job_id"));
        assert!(text.contains(&job.id().to_string()));
        assert!(text.contains("application/json"));
        assert!(text.contains(r#""ownerId":"u1""#));
        assert!(text.contains(r#""description":"Senior Go Engineer""#));
    }
}
