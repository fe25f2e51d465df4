use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const JOB_TAG: &str = "Jobs";
pub const CALLBACK_TAG: &str = "Worker callbacks";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Genflow",
        description = "Asynchronous generation job orchestration",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::jobs::JobStatus,
        )
    ),
    tags(
        (name = JOB_TAG, description = "Job submission and polling"),
        (name = CALLBACK_TAG, description = "Endpoints called by generation workers"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "callbackToken",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    crate::api::middleware::CALLBACK_TOKEN_HEADER,
                    "Shared secret configured in callbacks.token",
                ))),
            )
        }
    }
}
