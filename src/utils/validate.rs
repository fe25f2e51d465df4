//! Extractors that run `validator` rules after deserialization.

use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// JSON body that has passed its `Validate` rules.
///
/// Malformed JSON becomes `AppError::BadRequest`; rule violations become
/// `AppError::ValidationErrors`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Callback {
        #[validate(length(min = 1, message = "Result reference must not be empty"))]
        result_ref: String,
        #[validate(length(max = 5, message = "Code too long"))]
        code: Option<String>,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let request = json_request(r#"{"result_ref": "R1"}"#);

        let ValidatedJson(body) = ValidatedJson::<Callback>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(body.result_ref, "R1");
        assert!(body.code.is_none());
    }

    #[tokio::test]
    async fn test_rule_violations_are_collected_per_field() {
        let request = json_request(r#"{"result_ref": "", "code": "TOO_LONG_CODE"}"#);

        match ValidatedJson::<Callback>::from_request(request, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["code", "result_ref"]);
                assert!(errors[1].message.contains("must not be empty"));
            }
            other => panic!("Expected ValidationErrors, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = json_request(r#"{"result_ref": "#);

        assert!(matches!(
            ValidatedJson::<Callback>::from_request(request, &()).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/test")
            .body(Body::from(r#"{"result_ref": "R1"}"#))
            .unwrap();

        assert!(matches!(
            ValidatedJson::<Callback>::from_request(request, &()).await,
            Err(AppError::BadRequest { .. })
        ));
    }
}
