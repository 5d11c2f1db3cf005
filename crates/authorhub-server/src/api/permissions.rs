//! Permission API handlers: grants per (group, resource), access checks
//! and effective-permission listings.

use authorhub_core::models::access::EffectivePermissions;
use authorhub_core::models::permission::{Action, Permission, UpdatePermission};
use authorhub_core::repository::PermissionRepository;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::api::error::{ApiError, api_validation_error};
use crate::api::types::{
    CheckQuery, CheckResponse, CreatePermissionRequest, MessageResponse, UpdatePermissionRequest,
};
use crate::api::{parse_id, valid_body};
use crate::app::AppState;

/// Validated form of [`CheckQuery`].
#[derive(Debug)]
struct CheckParams {
    user_id: Uuid,
    resource: String,
    action: Action,
}

fn check_params(query: CheckQuery) -> Result<CheckParams, ApiError> {
    let user_id = match query.user_id.as_deref() {
        Some(raw) if !raw.is_empty() => parse_id(raw, "user_id")?,
        _ => return Err(api_validation_error("user_id is required")),
    };
    let resource = match query.resource {
        Some(resource) if !resource.is_empty() => resource,
        _ => return Err(api_validation_error("resource is required")),
    };
    let action = match query.action.as_deref() {
        Some(raw) if !raw.is_empty() => raw.parse::<Action>()?,
        _ => return Err(api_validation_error("action is required")),
    };
    Ok(CheckParams {
        user_id,
        resource,
        action,
    })
}

pub async fn check_permission(
    State(state): State<AppState>,
    query: Result<Query<CheckQuery>, QueryRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| api_validation_error(&rejection.body_text()))?;
    let params = check_params(query)?;

    let allowed = state
        .evaluator
        .check(params.user_id, &params.resource, params.action)
        .await?;

    Ok(Json(CheckResponse { allowed }))
}

pub async fn effective_permissions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<EffectivePermissions>, ApiError> {
    let user_id = parse_id(&user_id, "user id")?;
    Ok(Json(state.aggregator.effective_permissions(user_id).await?))
}

pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    Ok(Json(state.permissions.list().await?))
}

pub async fn list_group_permissions(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    let group_id = parse_id(&group_id, "group id")?;
    Ok(Json(state.permissions.list_by_group(group_id).await?))
}

pub async fn create_permission(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    payload: Result<Json<CreatePermissionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let group_id = parse_id(&group_id, "group id")?;
    let body = valid_body(payload)?;
    let permission = state.permissions.create(body.into_input(group_id)).await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

pub async fn update_permission(
    State(state): State<AppState>,
    Path((group_id, resource_id)): Path<(String, String)>,
    payload: Result<Json<UpdatePermissionRequest>, JsonRejection>,
) -> Result<Json<Permission>, ApiError> {
    let group_id = parse_id(&group_id, "group id")?;
    let resource_id = parse_id(&resource_id, "resource id")?;
    let input: UpdatePermission = valid_body(payload)?.into();
    if input.is_empty() {
        return Err(api_validation_error(
            "at least one of canRead, canCreate, canUpdate, canDelete is required",
        ));
    }
    Ok(Json(
        state
            .permissions
            .update(group_id, resource_id, input)
            .await?,
    ))
}

pub async fn delete_permission(
    State(state): State<AppState>,
    Path((group_id, resource_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let group_id = parse_id(&group_id, "group id")?;
    let resource_id = parse_id(&resource_id, "resource id")?;
    state.permissions.delete(group_id, resource_id).await?;
    Ok(Json(MessageResponse::new("Permission deleted")))
}
