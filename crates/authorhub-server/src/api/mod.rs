//! HTTP handlers and boundary types.

pub mod error;
pub mod groups;
pub mod permissions;
pub mod resources;
pub mod system;
pub mod types;
pub mod users;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use uuid::Uuid;
use validator::Validate;

use crate::api::error::{ApiError, api_validation_error};

/// Unwrap a JSON body and run its field validators.
pub(crate) fn valid_body<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(body) = payload.map_err(|rejection| api_validation_error(&rejection.body_text()))?;
    body.validate()
        .map_err(|errors| api_validation_error(&errors.to_string()))?;
    Ok(body)
}

/// Parse a path segment as an entity id.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| api_validation_error(&format!("invalid {what}: {raw}")))
}
