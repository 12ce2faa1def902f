//! Error taxonomy shared by the store and the input layer.

use thiserror::Error;

/// Result alias used by every store operation.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A record (or the parent a new record references) does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A uniqueness constraint would be violated.
    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// A required field is missing or malformed.
    #[error("invalid field '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }

    pub fn conflict(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        StoreError::Conflict {
            entity,
            field,
            value: value.into(),
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code, surfaced in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::Conflict { .. } => "CONFLICT",
            StoreError::Validation { .. } => "VALIDATION",
            StoreError::Database(_) => "DATABASE",
        }
    }
}
