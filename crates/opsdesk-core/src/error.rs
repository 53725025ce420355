//! Error types for OpsDesk.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OpsResult<T> = Result<T, OpsError>;
