//! Job DTOs for the polling surface and worker callbacks.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use validator::Validate;

use crate::jobs::payload::MAX_DESCRIPTION_LEN;
use crate::jobs::{Job, JobId, JobMetadata, JobPayload, JobStatus};

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for submitting a generation job.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "description": "Senior Go Engineer",
    "metadata": { "lang": "en", "template": "modern" }
}))]
pub struct SubmitJobRequest {
    #[validate(length(min = 1, max = MAX_DESCRIPTION_LEN, message = "Description must be between 1 and 20000 characters"))]
    #[schema(min_length = 1, max_length = 20000)]
    pub description: String,

    /// Free-form metadata forwarded to the worker unchanged
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: JobMetadata,
}

impl SubmitJobRequest {
    pub fn into_payload(self) -> JobPayload {
        JobPayload::new(self.description, self.metadata)
    }
}

/// Worker callback body for a successful generation.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteJobRequest {
    #[validate(length(min = 1, max = 255, message = "Result reference must be between 1 and 255 characters"))]
    #[schema(example = "resumes/2f1c7a.pdf")]
    pub result_ref: String,
}

/// Worker callback body for a failed generation.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FailJobRequest {
    #[validate(length(min = 1, message = "Message must not be empty"))]
    #[schema(example = "LLM timeout")]
    pub message: String,

    /// Defaults to `GENERATION_ERROR`
    #[validate(length(max = 50, message = "Code must be at most 50 characters"))]
    #[schema(example = "GENERATION_ERROR")]
    pub code: Option<String>,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response to an accepted submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobResponse {
    #[schema(value_type = String, format = Uuid)]
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Full job record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: JobId,
    pub owner_id: String,
    pub description: String,
    #[schema(value_type = Object)]
    pub metadata: JsonValue,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: String,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        let failure = job.failure().cloned();
        Self {
            id: job.id(),
            owner_id: job.owner_id().to_string(),
            description: job.payload().description.clone(),
            metadata: serde_json::to_value(&job.payload().metadata)
                .unwrap_or_else(|_| JsonValue::Object(Default::default())),
            status: job.status(),
            result_ref: job.result_ref().map(str::to_string),
            error_message: failure.as_ref().map(|f| f.message.clone()),
            error_code: failure.map(|f| f.code),
            created_at: job.created_at().to_string(),
            updated_at: job.updated_at().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobFailure;
    use serde_json::json;

    #[test]
    fn test_submit_request_without_metadata() {
        let req: SubmitJobRequest =
            serde_json::from_value(json!({"description": "Backend"})).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.into_payload().metadata.is_empty());
    }

    #[test]
    fn test_submit_request_keeps_unknown_metadata() {
        let req: SubmitJobRequest = serde_json::from_value(json!({
            "description": "Backend",
            "metadata": {"lang": "pt", "seniority": "staff"}
        }))
        .unwrap();

        let payload = req.into_payload();
        assert_eq!(payload.metadata.lang(), Some("pt"));
        assert_eq!(payload.metadata.get("seniority"), Some(&json!("staff")));
    }

    #[test]
    fn test_job_response_shape() {
        let mut job = Job::new("u1", JobPayload::new("Backend", JobMetadata::default()));
        job.fail(JobFailure::generation("LLM timeout", None)).unwrap();

        let value = serde_json::to_value(JobResponse::from(job.clone())).unwrap();

        assert_eq!(value["id"], json!(job.id().to_string()));
        assert_eq!(value["ownerId"], json!("u1"));
        assert_eq!(value["status"], json!("failed"));
        assert_eq!(value["errorMessage"], json!("LLM timeout"));
        assert_eq!(value["errorCode"], json!("GENERATION_ERROR"));
        assert_eq!(value["metadata"], json!({}));
        assert!(value.get("resultRef").is_none());
        assert!(value["createdAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_fail_request_code_is_optional() {
        let req: FailJobRequest = serde_json::from_value(json!({"message": "boom"})).unwrap();
        assert!(req.code.is_none());
        assert!(req.validate().is_ok());
    }
}
