//! SurrealDB repository implementations.
//!
//! Every mutation that touches more than one row runs as a single
//! guarded statement inside an explicit transaction: the existence
//! checks THROW a not-found marker, and the writes only happen in the
//! ELSE branch, so either everything commits or nothing does.
//!
//! Edge inserts also bump the `revision` of the records they point at,
//! so a concurrent delete of either endpoint becomes a write conflict
//! rather than leaving the edge behind.

mod access;
mod group;
mod permission;
mod resource;
mod user;

pub use access::SurrealAccessRepository;
pub use group::SurrealGroupRepository;
pub use permission::SurrealPermissionRepository;
pub use resource::SurrealResourceRepository;
pub use user::SurrealUserRepository;

use authorhub_core::models::membership::Membership;
use authorhub_core::models::permission::Permission;
use chrono::{DateTime, Utc};
use surrealdb_types::SurrealValue;
use tracing::warn;
use uuid::Uuid;

use crate::error::DbError;

/// Projection over `member_of` edges producing [`MembershipRow`]s.
pub(crate) const MEMBERSHIP_FIELDS: &str = "\
    meta::id(in) AS user_id, in.username AS username, \
    meta::id(out) AS group_id, out.name AS group_name, \
    created_at";

/// Projection over `permission` edges producing [`PermissionRow`]s.
pub(crate) const PERMISSION_FIELDS: &str = "\
    meta::id(id) AS record_id, \
    meta::id(in) AS group_id, in.name AS group_name, \
    meta::id(out) AS resource_id, out.key AS resource_key, \
    can_read, can_create, can_update, can_delete, \
    created_at, updated_at";

pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

/// Existence check row: `SELECT meta::id(id) AS record_id FROM ...`.
#[derive(Debug, SurrealValue)]
pub(crate) struct RecordIdRow {
    pub(crate) record_id: String,
}

/// DB-side row struct for a `member_of` edge.
///
/// The joined names are `None` when an endpoint record is gone.
#[derive(Debug, SurrealValue)]
pub(crate) struct MembershipRow {
    user_id: String,
    username: Option<String>,
    group_id: String,
    group_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl MembershipRow {
    /// `Ok(None)` for an edge whose user or group no longer exists.
    fn try_into_membership(self) -> Result<Option<Membership>, DbError> {
        let (Some(username), Some(group_name)) = (self.username, self.group_name) else {
            warn!(
                user_id = %self.user_id,
                group_id = %self.group_id,
                "Skipping membership with a missing endpoint"
            );
            return Ok(None);
        };
        Ok(Some(Membership {
            user_id: parse_uuid(&self.user_id, "user")?,
            username,
            group_id: parse_uuid(&self.group_id, "group")?,
            group_name,
            created_at: self.created_at,
        }))
    }
}

/// DB-side row struct for a `permission` edge.
#[derive(Debug, SurrealValue)]
pub(crate) struct PermissionRow {
    record_id: String,
    group_id: String,
    group_name: Option<String>,
    resource_id: String,
    resource_key: Option<String>,
    can_read: bool,
    can_create: bool,
    can_update: bool,
    can_delete: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRow {
    /// `Ok(None)` for an edge whose group or resource no longer exists.
    fn try_into_permission(self) -> Result<Option<Permission>, DbError> {
        let (Some(group_name), Some(resource_key)) = (self.group_name, self.resource_key) else {
            warn!(
                permission_id = %self.record_id,
                group_id = %self.group_id,
                resource_id = %self.resource_id,
                "Skipping permission with a missing endpoint"
            );
            return Ok(None);
        };
        Ok(Some(Permission {
            id: parse_uuid(&self.record_id, "permission")?,
            group_id: parse_uuid(&self.group_id, "group")?,
            group_name,
            resource_id: parse_uuid(&self.resource_id, "resource")?,
            resource_key,
            can_read: self.can_read,
            can_create: self.can_create,
            can_update: self.can_update,
            can_delete: self.can_delete,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

pub(crate) fn collect_memberships(rows: Vec<MembershipRow>) -> Result<Vec<Membership>, DbError> {
    rows.into_iter()
        .filter_map(|row| row.try_into_membership().transpose())
        .collect()
}

pub(crate) fn collect_permissions(rows: Vec<PermissionRow>) -> Result<Vec<Permission>, DbError> {
    rows.into_iter()
        .filter_map(|row| row.try_into_permission().transpose())
        .collect()
}
