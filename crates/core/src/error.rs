use crate::types::DbId;
use crate::validation::FieldViolation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// One or more input fields failed validation.
    #[error("Validation failed for {} field(s)", .0.len())]
    InvalidFields(Vec<FieldViolation>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a single-field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        CoreError::InvalidFields(vec![FieldViolation::new(field, message)])
    }
}
