//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations must enforce
//! the uniqueness invariants in the store itself and run every
//! multi-row mutation (existence guard plus insert, delete plus
//! cascades) as one atomic statement.

use uuid::Uuid;

use crate::error::AuthorHubResult;
use crate::models::{
    access::UserAccess,
    group::{CreateGroup, Group, GroupDetail, UpdateGroup},
    membership::Membership,
    permission::{CreatePermission, Permission, UpdatePermission},
    resource::{CreateResource, Resource, ResourceDetail, UpdateResource},
    user::{CreateUser, UpdateUser, User, UserDetail},
};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = AuthorHubResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AuthorHubResult<User>> + Send;
    /// The user with its group memberships.
    fn get_detail(&self, id: Uuid) -> impl Future<Output = AuthorHubResult<UserDetail>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = AuthorHubResult<User>> + Send;
    /// Hard delete. Removes the user's memberships in the same statement.
    fn delete(&self, id: Uuid) -> impl Future<Output = AuthorHubResult<()>> + Send;
    fn list(&self) -> impl Future<Output = AuthorHubResult<Vec<UserDetail>>> + Send;
}

pub trait GroupRepository: Send + Sync {
    fn create(&self, input: CreateGroup) -> impl Future<Output = AuthorHubResult<Group>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AuthorHubResult<Group>> + Send;
    /// The group with its members and permissions.
    fn get_detail(&self, id: Uuid)
    -> impl Future<Output = AuthorHubResult<GroupDetail>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateGroup,
    ) -> impl Future<Output = AuthorHubResult<Group>> + Send;
    /// Removes the group, its memberships and its permissions atomically.
    fn delete(&self, id: Uuid) -> impl Future<Output = AuthorHubResult<()>> + Send;
    fn list(&self) -> impl Future<Output = AuthorHubResult<Vec<GroupDetail>>> + Send;

    /// Link a user to a group. Fails `NotFound` if either side is
    /// missing and `Conflict` if the link already exists.
    fn add_member(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = AuthorHubResult<Membership>> + Send;

    /// Remove a user from a group. Fails `NotFound` if the link does
    /// not exist.
    fn remove_member(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = AuthorHubResult<()>> + Send;
}

pub trait ResourceRepository: Send + Sync {
    fn create(
        &self,
        input: CreateResource,
    ) -> impl Future<Output = AuthorHubResult<Resource>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AuthorHubResult<Resource>> + Send;
    /// The resource with the permissions referencing it.
    fn get_detail(
        &self,
        id: Uuid,
    ) -> impl Future<Output = AuthorHubResult<ResourceDetail>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateResource,
    ) -> impl Future<Output = AuthorHubResult<Resource>> + Send;
    /// Removes the resource and every permission referencing it.
    fn delete(&self, id: Uuid) -> impl Future<Output = AuthorHubResult<()>> + Send;
    fn list(&self) -> impl Future<Output = AuthorHubResult<Vec<ResourceDetail>>> + Send;
}

// ---------------------------------------------------------------------------
// Grants, keyed by the (group, resource) pair
// ---------------------------------------------------------------------------

pub trait PermissionRepository: Send + Sync {
    /// Grant flags on a resource to a group. Fails `NotFound` if the
    /// group or resource is missing and `Conflict` if the pair already
    /// holds a permission.
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = AuthorHubResult<Permission>> + Send;
    fn get(
        &self,
        group_id: Uuid,
        resource_id: Uuid,
    ) -> impl Future<Output = AuthorHubResult<Permission>> + Send;
    fn update(
        &self,
        group_id: Uuid,
        resource_id: Uuid,
        input: UpdatePermission,
    ) -> impl Future<Output = AuthorHubResult<Permission>> + Send;
    fn delete(
        &self,
        group_id: Uuid,
        resource_id: Uuid,
    ) -> impl Future<Output = AuthorHubResult<()>> + Send;
    fn list(&self) -> impl Future<Output = AuthorHubResult<Vec<Permission>>> + Send;

    /// All permissions held by a group. Fails `NotFound` if the group
    /// does not exist.
    fn list_by_group(
        &self,
        group_id: Uuid,
    ) -> impl Future<Output = AuthorHubResult<Vec<Permission>>> + Send;
}

// ---------------------------------------------------------------------------
// Read side for evaluation
// ---------------------------------------------------------------------------

pub trait AccessRepository: Send + Sync {
    /// Load a user's groups and every permission those groups hold.
    /// Fails `NotFound` if the user does not exist.
    fn load_user_access(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = AuthorHubResult<UserAccess>> + Send;
}
