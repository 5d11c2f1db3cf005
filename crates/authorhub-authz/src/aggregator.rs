//! Effective-permission aggregator: the audit view.

use authorhub_core::error::AuthorHubResult;
use authorhub_core::models::access::{EffectivePermission, EffectivePermissions, UserAccess};
use authorhub_core::repository::AccessRepository;
use uuid::Uuid;

/// Lists every grant reaching a user through their groups.
///
/// This is a flattening, not a merge: two groups granting on the same
/// resource produce two entries, each tagged with its group.
#[derive(Clone)]
pub struct PermissionAggregator<A: AccessRepository> {
    access: A,
}

impl<A: AccessRepository> PermissionAggregator<A> {
    pub fn new(access: A) -> Self {
        Self { access }
    }

    pub async fn effective_permissions(
        &self,
        user_id: Uuid,
    ) -> AuthorHubResult<EffectivePermissions> {
        let access = self.access.load_user_access(user_id).await?;
        Ok(flatten(access))
    }
}

/// One entry per (group, permission row). Entries follow the order of
/// `access.groups`, then the order each group's grants were loaded in.
pub fn flatten(access: UserAccess) -> EffectivePermissions {
    let UserAccess {
        user_id,
        groups,
        grants,
    } = access;

    let mut permissions = Vec::with_capacity(grants.len());
    for group in &groups {
        permissions.extend(
            grants
                .iter()
                .filter(|grant| grant.group_id == group.id)
                .map(|grant| EffectivePermission {
                    group_id: grant.group_id,
                    resource_key: grant.resource_key.clone(),
                    can_read: grant.can_read,
                    can_create: grant.can_create,
                    can_update: grant.can_update,
                    can_delete: grant.can_delete,
                }),
        );
    }

    EffectivePermissions {
        user_id,
        groups,
        permissions,
    }
}
