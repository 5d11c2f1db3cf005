//! Read models for authorization decisions and audits.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::Permission;

/// Id and name of a group, as listed in access views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRef {
    pub id: Uuid,
    pub name: String,
}

/// Everything needed to decide what a single user may do: the groups
/// the user belongs to and every permission row those groups hold.
#[derive(Debug, Clone)]
pub struct UserAccess {
    pub user_id: Uuid,
    pub groups: Vec<GroupRef>,
    pub grants: Vec<Permission>,
}

/// One grant as seen by a user, tagged with the group it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePermission {
    pub group_id: Uuid,
    pub resource_key: String,
    pub can_read: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

/// Provenance-tagged listing of every grant reaching a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePermissions {
    pub user_id: Uuid,
    pub groups: Vec<GroupRef>,
    pub permissions: Vec<EffectivePermission>,
}
