//! Serve command handler

use crate::config::{Settings, StoreBackend};
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Start the server, or with `dry_run` only check and summarise the
    /// configuration.
    pub async fn execute(&self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only()?;
            return Ok(());
        }
        Server::new(self.config.clone()).run().await
    }

    /// Validate configuration without touching the network.
    pub fn validate_only(&self) -> anyhow::Result<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        match self.config.store.backend {
            StoreBackend::Postgres => println!(
                "✓ Job store: postgres (pool {}..{}, auto-migrate: {})",
                self.config.database.min_connections,
                self.config.database.max_connections,
                self.config.database.auto_migrate
            ),
            StoreBackend::Memory => println!("✓ Job store: memory (jobs are lost on restart)"),
        }
        if self.config.broker.enabled {
            println!(
                "✓ Broker: stream '{}', consumer group '{}'",
                self.config.broker.stream_key(),
                self.config.broker.queue
            );
        } else {
            println!("! Broker disabled: jobs will be accepted but never delivered");
        }
        if !self.config.callbacks.enabled {
            println!("! Worker callback routes are not mounted");
        } else if self.config.callbacks.token.is_none() {
            println!("! Worker callback routes accept unauthenticated requests");
        }

        println!("Dry run completed successfully");
        Ok(())
    }
}
