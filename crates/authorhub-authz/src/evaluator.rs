//! Permission evaluator: the decision view.

use authorhub_core::error::AuthorHubResult;
use authorhub_core::models::access::UserAccess;
use authorhub_core::models::permission::Action;
use authorhub_core::repository::AccessRepository;
use tracing::debug;
use uuid::Uuid;

/// Decides whether a user may perform an action on a resource.
///
/// A request is allowed when at least one of the user's groups holds a
/// permission on the resource with the matching flag set. Resource keys
/// are compared by exact string equality.
#[derive(Clone)]
pub struct PermissionEvaluator<A: AccessRepository> {
    access: A,
}

impl<A: AccessRepository> PermissionEvaluator<A> {
    pub fn new(access: A) -> Self {
        Self { access }
    }

    /// Fails `NotFound` if the user does not exist. An unknown resource
    /// key is not an error; it simply yields `false`.
    pub async fn check(
        &self,
        user_id: Uuid,
        resource_key: &str,
        action: Action,
    ) -> AuthorHubResult<bool> {
        let access = self.access.load_user_access(user_id).await?;
        let allowed = is_allowed(&access, resource_key, action);

        debug!(
            %user_id,
            resource_key,
            action = %action,
            allowed,
            "Permission checked"
        );

        Ok(allowed)
    }
}

/// OR across every grant on `resource_key` held by the user's groups.
pub fn is_allowed(access: &UserAccess, resource_key: &str, action: Action) -> bool {
    access
        .grants
        .iter()
        .filter(|grant| grant.resource_key == resource_key)
        .any(|grant| grant.allows(action))
}

#[cfg(test)]
mod tests {
    use authorhub_core::models::access::GroupRef;
    use authorhub_core::models::permission::Permission;
    use chrono::Utc;

    use super::*;

    fn grant(group: &GroupRef, key: &str, read: bool, update: bool) -> Permission {
        let now = Utc::now();
        Permission {
            id: Uuid::new_v4(),
            group_id: group.id,
            group_name: group.name.clone(),
            resource_id: Uuid::new_v4(),
            resource_key: key.into(),
            can_read: read,
            can_create: false,
            can_update: update,
            can_delete: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn group(name: &str) -> GroupRef {
        GroupRef {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    #[test]
    fn no_groups_denies_everything() {
        let access = UserAccess {
            user_id: Uuid::new_v4(),
            groups: vec![],
            grants: vec![],
        };
        for action in Action::ALL {
            assert!(!is_allowed(&access, "reports", action));
        }
    }

    #[test]
    fn any_granting_group_allows() {
        let viewers = group("viewers");
        let auditors = group("auditors");
        let access = UserAccess {
            user_id: Uuid::new_v4(),
            grants: vec![
                grant(&viewers, "reports", false, false),
                grant(&auditors, "reports", true, false),
            ],
            groups: vec![viewers, auditors],
        };

        assert!(is_allowed(&access, "reports", Action::Read));
        assert!(!is_allowed(&access, "reports", Action::Update));
    }

    #[test]
    fn resource_keys_match_exactly() {
        let editors = group("editors");
        let access = UserAccess {
            user_id: Uuid::new_v4(),
            grants: vec![grant(&editors, "account", true, true)],
            groups: vec![editors],
        };

        assert!(is_allowed(&access, "account", Action::Read));
        assert!(!is_allowed(&access, "account/change-password", Action::Read));
        assert!(!is_allowed(&access, "Account", Action::Read));
    }
}
