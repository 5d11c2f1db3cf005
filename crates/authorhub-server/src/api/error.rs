//! API error type and helpers.
//!
//! Every error response carries a stable `code` and a human-readable
//! `message`; the status always matches the code.

use authorhub_core::error::AuthorHubError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::api::types::ErrorResponse;

/// Structured API error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
        },
    }
}

/// Build a 400 Bad Request validation error.
pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// Build a 404 Not Found error.
pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 409 Conflict error.
pub fn api_conflict(message: &str) -> ApiError {
    api_error(StatusCode::CONFLICT, "conflict", message)
}

/// Build a 500 Internal Server Error. Details stay in the server log.
pub fn api_internal(detail: &str) -> ApiError {
    tracing::error!(error = %detail, "AuthorHub store error");
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "internal server error",
    )
}

impl From<AuthorHubError> for ApiError {
    fn from(err: AuthorHubError) -> Self {
        match err {
            AuthorHubError::Validation { message } => api_validation_error(&message),
            AuthorHubError::NotFound { entity, id } => {
                api_not_found(&format!("{entity} not found: {id}"))
            }
            AuthorHubError::Conflict { entity, message } => {
                api_conflict(&format!("{entity} already exists ({message})"))
            }
            AuthorHubError::Internal(detail) => api_internal(&detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (
                AuthorHubError::validation("bad"),
                StatusCode::BAD_REQUEST,
                "validation_error",
            ),
            (
                AuthorHubError::not_found("user", "abc"),
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                AuthorHubError::Conflict {
                    entity: "group".into(),
                    message: "unique index `idx_group_name` violated".into(),
                },
                StatusCode::CONFLICT,
                "conflict",
            ),
            (
                AuthorHubError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.body.code, code);
        }
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let api: ApiError = AuthorHubError::Internal("connection reset".into()).into();
        assert_eq!(api.body.message, "internal server error");
    }

    #[test]
    fn not_found_names_entity() {
        let api: ApiError = AuthorHubError::not_found("group", "g1").into();
        assert_eq!(api.body.message, "group not found: g1");
    }
}
