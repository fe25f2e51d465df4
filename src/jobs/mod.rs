//! Generation job domain: identifiers, payload, the state machine and the
//! message published for workers.

pub mod job;
pub mod models;
pub mod payload;
pub mod types;
pub mod work_item;

pub use job::Job;
pub use models::GenerationJobRow;
pub use payload::{JobMetadata, JobPayload};
pub use types::{
    GENERATION_ERROR, JobFailure, JobId, JobState, JobStatus, MAX_ERROR_CODE_LEN,
    MAX_OWNER_ID_LEN, MAX_RESULT_REF_LEN, QUEUE_ERROR, QUEUE_ERROR_MESSAGE,
};
pub use work_item::WorkItem;
