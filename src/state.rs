//! Application state for Axum handlers.

use std::sync::Arc;

use crate::broker::JobPublisher;
use crate::config::CallbacksConfig;
use crate::repositories::JobStore;
use crate::services::Services;

/// Shared services and resources.
///
/// Everything inside is reference counted, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Worker callback settings, read by the callback guard
    pub callbacks: CallbacksConfig,
}

impl AppState {
    /// Wire the services over an already constructed store and publisher.
    ///
    /// # Example
    /// ```ignore
    /// let publisher = init_publisher(&settings.broker).await;
    /// let state = AppState::new(store, publisher, settings.broker.publish_timeout(), settings.callbacks.clone());
    /// ```
    pub fn new(
        store: Arc<dyn JobStore>,
        publisher: Arc<dyn JobPublisher>,
        publish_timeout: std::time::Duration,
        callbacks: CallbacksConfig,
    ) -> Self {
        Self {
            services: Services::new(store, publisher, publish_timeout),
            callbacks,
        }
    }
}
