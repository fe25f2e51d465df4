//! Router configuration.

use std::time::Duration;

use axum::{Router, middleware};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{callback_auth_middleware, logging_middleware, request_id_middleware};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// # Routes
/// - `/api/jobs` - job submission and polling, scoped to the `x-user-id` caller
/// - `/internal/jobs` - worker callbacks, mounted when `callbacks.enabled`
/// - `/health`, `/health/ready`, `/health/live`
/// - `/swagger-ui` and `/api-docs/openapi.json`
///
/// Middleware runs outermost first: request id, logging, then the timeout.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let mut api = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/jobs", handlers::jobs::job_routes())
        .merge(handlers::health::health_routes());

    if state.callbacks.enabled {
        let callbacks = handlers::callbacks::callback_routes().layer(
            middleware::from_fn_with_state(state.clone(), callback_auth_middleware),
        );
        api = api.nest("/internal/jobs", callbacks);
    }

    let (router, openapi) = api.split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::extract::OWNER_ID_HEADER;
    use crate::api::middleware::CALLBACK_TOKEN_HEADER;
    use crate::broker::{BrokerError, JobPublisher, NoOpPublisher};
    use crate::config::CallbacksConfig;
    use crate::jobs::WorkItem;
    use crate::repositories::{JobStore, MemoryJobStore};
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const TOKEN: &str = "worker-secret-0123456789";

    struct FailingPublisher;

    #[async_trait]
    impl JobPublisher for FailingPublisher {
        async fn publish(&self, _item: &WorkItem) -> Result<(), BrokerError> {
            Err(BrokerError::Publish("channel closed".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    struct HangingPublisher;

    #[async_trait]
    impl JobPublisher for HangingPublisher {
        async fn publish(&self, _item: &WorkItem) -> Result<(), BrokerError> {
            std::future::pending::<()>().await;
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "hanging"
        }
    }

    fn app_with(publisher: Arc<dyn JobPublisher>, callbacks: CallbacksConfig) -> Router {
        let state = AppState::new(
            Arc::new(MemoryJobStore::new()),
            publisher,
            Duration::from_secs(1),
            callbacks,
        );
        create_router(state, Duration::from_secs(5))
    }

    fn app() -> Router {
        app_with(
            Arc::new(NoOpPublisher::new()),
            CallbacksConfig {
                enabled: true,
                token: Some(TOKEN.to_string()),
            },
        )
    }

    fn request(method: Method, uri: &str, owner: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(owner) = owner {
            builder = builder.header(OWNER_ID_HEADER, owner);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn callback(uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut req = request(Method::POST, uri, None, body);
        if let Some(token) = token {
            req.headers_mut()
                .insert(CALLBACK_TOKEN_HEADER, token.parse().unwrap());
        }
        req
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn submit(app: &Router, owner: &str, description: &str) -> String {
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/api/jobs",
                Some(owner),
                Some(json!({"description": description, "metadata": {"lang": "en"}})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        body["jobId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_submit_then_poll() {
        let app = app();
        let job_id = submit(&app, "u1", "Senior Go Engineer").await;

        let (status, body) = send(
            &app,
            request(Method::GET, &format!("/api/jobs/{job_id}"), Some("u1"), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], json!(job_id));
        assert_eq!(body["ownerId"], json!("u1"));
        assert_eq!(body["status"], json!("pending"));
        assert_eq!(body["description"], json!("Senior Go Engineer"));
        assert_eq!(body["metadata"], json!({"lang": "en"}));
    }

    #[tokio::test]
    async fn test_submit_response_shape() {
        let app = app();
        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/jobs",
                Some("u1"),
                Some(json!({"description": "Backend"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], json!("pending"));
        assert!(body["jobId"].is_string());
    }

    #[tokio::test]
    async fn test_missing_caller_is_unauthorized() {
        let (status, body) = send(
            &app(),
            request(Method::GET, "/api/jobs", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], json!("UNAUTHORIZED"));
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected() {
        let (status, body) = send(
            &app(),
            request(
                Method::POST,
                "/api/jobs",
                Some("u1"),
                Some(json!({"description": "   "})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_foreign_job_is_not_found() {
        let app = app();
        let job_id = submit(&app, "u1", "Backend").await;

        let (status, body) = send(
            &app,
            request(Method::GET, &format!("/api/jobs/{job_id}"), Some("u2"), None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], json!("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_malformed_job_id() {
        let (status, _) = send(
            &app(),
            request(Method::GET, "/api/jobs/not-a-uuid", Some("u1"), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let app = app();
        let first = submit(&app, "u1", "First").await;
        let second = submit(&app, "u1", "Second").await;
        submit(&app, "u2", "Other").await;

        let (status, body) = send(&app, request(Method::GET, "/api/jobs", Some("u1"), None)).await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|job| job["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![second.as_str(), first.as_str()]);
    }

    #[tokio::test]
    async fn test_publish_failure_is_queue_error() {
        let app = app_with(Arc::new(FailingPublisher), CallbacksConfig::default());

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/jobs",
                Some("u1"),
                Some(json!({"description": "Backend"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], json!("QUEUE_ERROR"));

        let job_id = body["details"]["jobId"].as_str().unwrap().to_string();
        let (_, job) = send(
            &app,
            request(Method::GET, &format!("/api/jobs/{job_id}"), Some("u1"), None),
        )
        .await;
        assert_eq!(job["status"], json!("failed"));
        assert_eq!(job["errorCode"], json!("QUEUE_ERROR"));
        assert_eq!(job["errorMessage"], json!("Failed to queue job for processing"));
    }

    #[tokio::test]
    async fn test_request_timeout_does_not_strand_pending_job() {
        let store = Arc::new(MemoryJobStore::new());
        let state = AppState::new(
            store.clone(),
            Arc::new(HangingPublisher),
            Duration::from_millis(300),
            CallbacksConfig::default(),
        );
        let app = create_router(state, Duration::from_millis(100));

        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/jobs",
                Some("u1"),
                Some(json!({"description": "Backend"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let jobs = store.list("u1").await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status(), crate::jobs::JobStatus::Failed);
        assert_eq!(jobs[0].failure().unwrap().code, crate::jobs::QUEUE_ERROR);
    }

    #[tokio::test]
    async fn test_worker_callbacks_close_the_job() {
        let app = app();
        let job_id = submit(&app, "u1", "Backend").await;

        let (status, _) = send(
            &app,
            callback(
                &format!("/internal/jobs/{job_id}/complete"),
                None,
                Some(json!({"resultRef": "R1"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            callback(&format!("/internal/jobs/{job_id}/processing"), Some(TOKEN), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            callback(
                &format!("/internal/jobs/{job_id}/complete"),
                Some(TOKEN),
                Some(json!({"resultRef": "R1"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("completed"));
        assert_eq!(body["resultRef"], json!("R1"));

        let (status, body) = send(
            &app,
            callback(
                &format!("/internal/jobs/{job_id}/fail"),
                Some(TOKEN),
                Some(json!({"message": "late"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], json!("INVALID_TRANSITION"));
    }

    #[tokio::test]
    async fn test_fail_callback_defaults_code() {
        let app = app();
        let job_id = submit(&app, "u1", "Backend").await;

        let (status, body) = send(
            &app,
            callback(
                &format!("/internal/jobs/{job_id}/fail"),
                Some(TOKEN),
                Some(json!({"message": "LLM timeout"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("failed"));
        assert_eq!(body["errorCode"], json!("GENERATION_ERROR"));
    }

    #[tokio::test]
    async fn test_cancel_then_cancel_again() {
        let app = app();
        let job_id = submit(&app, "u1", "Backend").await;
        let uri = format!("/api/jobs/{job_id}/cancel");

        let (status, body) = send(&app, request(Method::POST, &uri, Some("u1"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("cancelled"));

        let (status, _) = send(&app, request(Method::POST, &uri, Some("u1"), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_disabled_callbacks_are_not_mounted() {
        let app = app_with(
            Arc::new(NoOpPublisher::new()),
            CallbacksConfig {
                enabled: false,
                token: None,
            },
        );
        let job_id = submit(&app, "u1", "Backend").await;

        let (status, _) = send(
            &app,
            callback(&format!("/internal/jobs/{job_id}/processing"), None, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_reports_degraded_broker() {
        let (status, body) = send(&app(), request(Method::GET, "/health", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("degraded"));
        assert_eq!(body["checks"]["broker"]["status"], json!("degraded"));
        assert_eq!(body["checks"]["store"]["status"], json!("healthy"));

        let (status, _) = send(&app(), request(Method::GET, "/health/ready", None, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app(), request(Method::GET, "/health/live", None, None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (status, body) = send(
            &app(),
            request(Method::GET, "/api-docs/openapi.json", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].as_object().unwrap().contains_key("/health"));
    }
}
