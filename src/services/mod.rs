//! Service layer.
//!
//! Services hold the business rules and coordinate the store with the
//! broker. Handlers only translate HTTP into service calls.

mod job_service;

pub use job_service::JobService;

use std::sync::Arc;
use std::time::Duration;

use crate::broker::JobPublisher;
use crate::repositories::JobStore;

/// Aggregates all services for use as Axum state.
#[derive(Clone)]
pub struct Services {
    pub jobs: JobService,
}

impl Services {
    pub fn new(
        store: Arc<dyn JobStore>,
        publisher: Arc<dyn JobPublisher>,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            jobs: JobService::new(store, publisher, publish_timeout),
        }
    }
}
