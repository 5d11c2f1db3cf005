//! Group and membership API handlers.

use authorhub_core::models::group::{Group, GroupDetail};
use authorhub_core::repository::GroupRepository;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::api::error::ApiError;
use crate::api::types::{
    AddMemberRequest, CreateGroupRequest, MessageResponse, UpdateGroupRequest,
};
use crate::api::{parse_id, valid_body};
use crate::app::AppState;

pub async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupDetail>>, ApiError> {
    Ok(Json(state.groups.list().await?))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GroupDetail>, ApiError> {
    let id = parse_id(&id, "group id")?;
    Ok(Json(state.groups.get_detail(id).await?))
}

pub async fn create_group(
    State(state): State<AppState>,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = valid_body(payload)?;
    let group = state.groups.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGroupRequest>, JsonRejection>,
) -> Result<Json<Group>, ApiError> {
    let id = parse_id(&id, "group id")?;
    let body = valid_body(payload)?;
    Ok(Json(state.groups.update(id, body.into()).await?))
}

/// Deleting a group also drops its memberships and permissions.
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, "group id")?;
    state.groups.delete(id).await?;
    Ok(Json(MessageResponse::new("Group deleted")))
}

pub async fn add_member(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let group_id = parse_id(&group_id, "group id")?;
    let body = valid_body(payload)?;
    let membership = state.groups.add_member(body.user_id, group_id).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let group_id = parse_id(&group_id, "group id")?;
    let user_id = parse_id(&user_id, "user id")?;
    state.groups.remove_member(user_id, group_id).await?;
    Ok(Json(MessageResponse::new("User removed from group")))
}
