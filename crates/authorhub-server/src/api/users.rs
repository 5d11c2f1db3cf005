//! User API handlers.

use authorhub_core::models::user::{User, UserDetail};
use authorhub_core::repository::UserRepository;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::api::error::ApiError;
use crate::api::types::{CreateUserRequest, MessageResponse, UpdateUserRequest};
use crate::api::{parse_id, valid_body};
use crate::app::AppState;

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserDetail>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDetail>, ApiError> {
    let id = parse_id(&id, "user id")?;
    Ok(Json(state.users.get_detail(id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = valid_body(payload)?;
    let user = state.users.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id, "user id")?;
    let body = valid_body(payload)?;
    Ok(Json(state.users.update(id, body.into()).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, "user id")?;
    state.users.delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}
