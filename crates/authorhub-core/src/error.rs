//! Error types for the AuthorHub system.
//!
//! The set of variants is closed: the store, the evaluator and the
//! aggregator surface exactly these kinds, and transport layers map
//! them one-to-one onto responses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthorHubError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict on {entity}: {message}")]
    Conflict { entity: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthorHubError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

pub type AuthorHubResult<T> = Result<T, AuthorHubError>;
