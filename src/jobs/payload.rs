use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

/// Longest accepted generation request text, in characters
pub const MAX_DESCRIPTION_LEN: u64 = 20_000;

/// Caller/worker owned metadata.
///
/// The schema belongs to callers and workers, so every key is kept exactly
/// as received, explicit `null`s and non-string values included. `lang` and
/// `template` are read by current workers and get typed accessors; a value
/// of another shape is still stored, it just does not read as a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobMetadata {
    entries: Map<String, Value>,
}

impl JobMetadata {
    pub const LANG: &'static str = "lang";
    pub const TEMPLATE: &'static str = "template";

    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn lang(&self) -> Option<&str> {
        self.get(Self::LANG).and_then(Value::as_str)
    }

    pub fn template(&self) -> Option<&str> {
        self.get(Self::TEMPLATE).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse from a stored JSON document; `null` means empty.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other),
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// The generation request carried by a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct JobPayload {
    #[validate(
        length(min = 1, max = MAX_DESCRIPTION_LEN, message = "Description must be between 1 and 20000 characters"),
        custom(function = "not_blank")
    )]
    pub description: String,

    #[serde(default)]
    pub metadata: JobMetadata,
}

impl JobPayload {
    pub fn new(description: impl Into<String>, metadata: JobMetadata) -> Self {
        Self {
            description: description.into(),
            metadata,
        }
    }
}

#[allow(clippy::ptr_arg)]
fn not_blank(value: &String) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Description must not be blank".into());
        return Err(err);
    }
    Ok(())
}
