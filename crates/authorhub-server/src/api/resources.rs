//! Resource API handlers.

use authorhub_core::models::resource::{Resource, ResourceDetail};
use authorhub_core::repository::ResourceRepository;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::api::error::ApiError;
use crate::api::types::{CreateResourceRequest, MessageResponse, UpdateResourceRequest};
use crate::api::{parse_id, valid_body};
use crate::app::AppState;

pub async fn list_resources(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResourceDetail>>, ApiError> {
    Ok(Json(state.resources.list().await?))
}

pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResourceDetail>, ApiError> {
    let id = parse_id(&id, "resource id")?;
    Ok(Json(state.resources.get_detail(id).await?))
}

pub async fn create_resource(
    State(state): State<AppState>,
    payload: Result<Json<CreateResourceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = valid_body(payload)?;
    let resource = state.resources.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateResourceRequest>, JsonRejection>,
) -> Result<Json<Resource>, ApiError> {
    let id = parse_id(&id, "resource id")?;
    let body = valid_body(payload)?;
    Ok(Json(state.resources.update(id, body.into()).await?))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, "resource id")?;
    state.resources.delete(id).await?;
    Ok(Json(MessageResponse::new("Resource deleted")))
}
