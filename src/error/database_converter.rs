use crate::error::AppError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info, operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: Box<dyn diesel::result::DatabaseErrorInformation + Send + Sync>,
        operation: &str,
    ) -> AppError {
        let message = info.message();

        match kind {
            DatabaseErrorKind::UniqueViolation => {
                let entity = info.table_name().unwrap_or("resource").to_string();
                let (field, value) = Self::extract_key_value(info.details().unwrap_or(message))
                    .unwrap_or_else(|| ("id".to_string(), "unknown".to_string()));
                AppError::Duplicate {
                    entity,
                    field,
                    value,
                }
            }
            DatabaseErrorKind::NotNullViolation | DatabaseErrorKind::CheckViolation => {
                AppError::Validation {
                    field: info.column_name().unwrap_or("unknown").to_string(),
                    reason: message.to_string(),
                }
            }
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("Database error: {}", message)),
            },
        }
    }

    /// Pulls `(column, value)` out of a Postgres detail line such as
    /// `Key (id)=(42) already exists.`
    fn extract_key_value(text: &str) -> Option<(String, String)> {
        let rest = &text[text.find("Key (")? + 5..];
        let close = rest.find(")=(")?;
        let field = &rest[..close];
        let rest = &rest[close + 3..];
        let value = &rest[..rest.find(')')?];
        Some((field.to_string(), value.to_string()))
    }
}
