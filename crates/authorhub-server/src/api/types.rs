//! HTTP request/response types.
//!
//! Request bodies are validated at the boundary and converted into the
//! core input types before any repository call.

use authorhub_core::models::group::{CreateGroup, UpdateGroup};
use authorhub_core::models::permission::{CreatePermission, UpdatePermission};
use authorhub_core::models::resource::{CreateResource, UpdateResource};
use authorhub_core::models::user::{CreateUser, UpdateUser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "username must not be empty"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub name: Option<String>,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(req: CreateUserRequest) -> Self {
        CreateUser {
            username: req.username,
            email: req.email,
            name: req.name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255, message = "username must not be empty"))]
    pub username: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub name: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        UpdateUser {
            username: req.username,
            email: req.email,
            name: req.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
}

impl From<CreateGroupRequest> for CreateGroup {
    fn from(req: CreateGroupRequest) -> Self {
        CreateGroup {
            name: req.name,
            description: req.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateGroupRequest> for UpdateGroup {
    fn from(req: UpdateGroupRequest) -> Self {
        UpdateGroup {
            name: req.name,
            description: req.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 512, message = "key must not be empty"))]
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<CreateResourceRequest> for CreateResource {
    fn from(req: CreateResourceRequest) -> Self {
        CreateResource {
            key: req.key,
            name: req.name,
            description: req.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    #[validate(length(min = 1, max = 512, message = "key must not be empty"))]
    pub key: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateResourceRequest> for UpdateResource {
    fn from(req: UpdateResourceRequest) -> Self {
        UpdateResource {
            key: req.key,
            name: req.name,
            description: req.description,
        }
    }
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// Omitted flags default to `false`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    pub resource_id: Uuid,
    #[serde(default)]
    pub can_read: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl CreatePermissionRequest {
    pub fn into_input(self, group_id: Uuid) -> CreatePermission {
        CreatePermission {
            group_id,
            resource_id: self.resource_id,
            can_read: self.can_read,
            can_create: self.can_create,
            can_update: self.can_update,
            can_delete: self.can_delete,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    pub can_read: Option<bool>,
    pub can_create: Option<bool>,
    pub can_update: Option<bool>,
    pub can_delete: Option<bool>,
}

impl From<UpdatePermissionRequest> for UpdatePermission {
    fn from(req: UpdatePermissionRequest) -> Self {
        UpdatePermission {
            can_read: req.can_read,
            can_create: req.can_create,
            can_update: req.can_update,
            can_delete: req.can_delete,
        }
    }
}

/// Query string of `GET /api/permissions/check`. Fields are optional
/// here so that a missing one reports which parameter is absent.
#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub user_id: Option<String>,
    pub resource: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
}
