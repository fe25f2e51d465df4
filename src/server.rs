//! HTTP server lifecycle: wiring, startup and graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::broker::init_publisher;
use crate::config::{Settings, StoreBackend};
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::repositories::{JobStore, MemoryJobStore, PgJobStore};
use crate::state::AppState;

pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Build the job store and publisher, then serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// - Database pool or migration failures (postgres store only)
    /// - Address binding errors
    /// - Server runtime errors
    ///
    /// An unreachable broker is not an error: the server starts with the
    /// no-op publisher and reports itself degraded.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.settings.environment,
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            request_timeout = %self.settings.server.request_timeout,
            "Server configuration loaded"
        );

        tracing::info!(
            level = %self.settings.logger.level,
            console_enabled = %self.settings.logger.console.enabled,
            file_enabled = %self.settings.logger.file.enabled,
            "Logger configuration loaded"
        );

        let store = self.build_store().await?;
        tracing::info!(backend = store.backend_name(), "Job store ready");

        let publisher = init_publisher(&self.settings.broker).await;
        tracing::info!(
            backend = publisher.backend_name(),
            degraded = publisher.is_degraded(),
            "Job publisher ready"
        );

        if self.settings.callbacks.enabled && self.settings.callbacks.token.is_none() {
            tracing::warn!("Worker callback routes are mounted without a token");
        }

        let state = AppState::new(
            store,
            Arc::clone(&publisher),
            self.settings.broker.publish_timeout(),
            self.settings.callbacks.clone(),
        );
        let router = create_router(
            state,
            Duration::from_secs(self.settings.server.request_timeout),
        );

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        publisher.close().await;
        tracing::info!("Server shutdown complete");

        Ok(())
    }

    async fn build_store(&self) -> anyhow::Result<Arc<dyn JobStore>> {
        match self.settings.store.backend {
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory job store; jobs are lost on restart");
                Ok(Arc::new(MemoryJobStore::new()))
            }
            StoreBackend::Postgres => {
                let database = &self.settings.database;
                tracing::info!(
                    max_connections = %database.max_connections,
                    min_connections = %database.min_connections,
                    connection_timeout = %database.connection_timeout,
                    "Initializing database connection pool"
                );

                if database.auto_migrate {
                    let applied = run_pending_migrations(&database.url).await?;
                    tracing::info!(applied = ?applied, "Database migrations applied");
                }

                let pool = establish_async_connection_pool(database).await?;
                Ok(Arc::new(PgJobStore::new(pool)))
            }
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires, so the
/// other signal still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
