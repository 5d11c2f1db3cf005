//! SurrealDB implementation of [`PermissionRepository`].
//!
//! A permission is a `permission` edge from a group to a resource. The
//! unique `(in, out)` index keeps at most one edge per pair.

use authorhub_core::error::AuthorHubResult;
use authorhub_core::models::permission::{CreatePermission, Permission, UpdatePermission};
use authorhub_core::repository::PermissionRepository;
use surrealdb::{Connection, Surreal};
use tracing::debug;
use uuid::Uuid;

use super::{PERMISSION_FIELDS, PermissionRow, RecordIdRow, collect_permissions};
use crate::error::{DbError, check_response, not_found_marker};

fn pair_id(group_id: Uuid, resource_id: Uuid) -> String {
    format!("{group_id}:{resource_id}")
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn create(&self, input: CreatePermission) -> AuthorHubResult<Permission> {
        let id = Uuid::new_v4();
        let group_id_str = input.group_id.to_string();
        let resource_id_str = input.resource_id.to_string();
        let missing_group = not_found_marker("group", &group_id_str);
        let missing_resource = not_found_marker("resource", &resource_id_str);

        // The parent bumps conflict with a concurrent delete of the group
        // or the resource, so the edge can never outlive either.
        let query = format!(
            "BEGIN TRANSACTION; \
             IF !record::exists(type::record('group', $group_id)) {{ THROW '{missing_group}' }} \
             ELSE IF !record::exists(type::record('resource', $resource_id)) \
             {{ THROW '{missing_resource}' }} \
             ELSE {{ \
                 UPDATE type::record('group', $group_id) SET revision += 1; \
                 UPDATE type::record('resource', $resource_id) SET revision += 1; \
                 RELATE group:`{group_id_str}` -> permission:`{id}` -> resource:`{resource_id_str}` \
                 SET can_read = $can_read, can_create = $can_create, \
                 can_update = $can_update, can_delete = $can_delete; \
             }}; \
             COMMIT TRANSACTION;"
        );

        let response = self
            .db
            .query(query)
            .bind(("group_id", group_id_str))
            .bind(("resource_id", resource_id_str))
            .bind(("can_read", input.can_read))
            .bind(("can_create", input.can_create))
            .bind(("can_update", input.can_update))
            .bind(("can_delete", input.can_delete))
            .await
            .map_err(DbError::from)?;
        check_response("permission", response)?;

        debug!(
            permission_id = %id,
            group_id = %input.group_id,
            resource_id = %input.resource_id,
            "Permission granted"
        );

        self.get(input.group_id, input.resource_id).await
    }

    async fn get(&self, group_id: Uuid, resource_id: Uuid) -> AuthorHubResult<Permission> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {PERMISSION_FIELDS} FROM permission \
                 WHERE in = type::record('group', $group_id) \
                 AND out = type::record('resource', $resource_id)"
            ))
            .bind(("group_id", group_id.to_string()))
            .bind(("resource_id", resource_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let permission = collect_permissions(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "permission".into(),
                id: pair_id(group_id, resource_id),
            })?;

        Ok(permission)
    }

    async fn update(
        &self,
        group_id: Uuid,
        resource_id: Uuid,
        input: UpdatePermission,
    ) -> AuthorHubResult<Permission> {
        let missing = not_found_marker("permission", &pair_id(group_id, resource_id));

        let mut sets = Vec::new();
        if input.can_read.is_some() {
            sets.push("can_read = $can_read");
        }
        if input.can_create.is_some() {
            sets.push("can_create = $can_create");
        }
        if input.can_update.is_some() {
            sets.push("can_update = $can_update");
        }
        if input.can_delete.is_some() {
            sets.push("can_delete = $can_delete");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "BEGIN TRANSACTION; \
             IF array::len((SELECT VALUE id FROM permission \
                 WHERE in = type::record('group', $group_id) \
                 AND out = type::record('resource', $resource_id))) = 0 \
             {{ THROW '{missing}' }} \
             ELSE {{ \
                 UPDATE permission SET {} \
                 WHERE in = type::record('group', $group_id) \
                 AND out = type::record('resource', $resource_id); \
             }}; \
             COMMIT TRANSACTION;",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("group_id", group_id.to_string()))
            .bind(("resource_id", resource_id.to_string()));

        if let Some(flag) = input.can_read {
            builder = builder.bind(("can_read", flag));
        }
        if let Some(flag) = input.can_create {
            builder = builder.bind(("can_create", flag));
        }
        if let Some(flag) = input.can_update {
            builder = builder.bind(("can_update", flag));
        }
        if let Some(flag) = input.can_delete {
            builder = builder.bind(("can_delete", flag));
        }

        let response = builder.await.map_err(DbError::from)?;
        check_response("permission", response)?;

        debug!(%group_id, %resource_id, "Permission updated");

        self.get(group_id, resource_id).await
    }

    async fn delete(&self, group_id: Uuid, resource_id: Uuid) -> AuthorHubResult<()> {
        let missing = not_found_marker("permission", &pair_id(group_id, resource_id));

        let query = format!(
            "BEGIN TRANSACTION; \
             IF array::len((SELECT VALUE id FROM permission \
                 WHERE in = type::record('group', $group_id) \
                 AND out = type::record('resource', $resource_id))) = 0 \
             {{ THROW '{missing}' }} \
             ELSE {{ \
                 DELETE permission \
                 WHERE in = type::record('group', $group_id) \
                 AND out = type::record('resource', $resource_id); \
             }}; \
             COMMIT TRANSACTION;"
        );

        let response = self
            .db
            .query(query)
            .bind(("group_id", group_id.to_string()))
            .bind(("resource_id", resource_id.to_string()))
            .await
            .map_err(DbError::from)?;
        check_response("permission", response)?;

        debug!(%group_id, %resource_id, "Permission revoked");

        Ok(())
    }

    async fn list(&self) -> AuthorHubResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {PERMISSION_FIELDS} FROM permission ORDER BY created_at ASC"
            ))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;

        Ok(collect_permissions(rows)?)
    }

    async fn list_by_group(&self, group_id: Uuid) -> AuthorHubResult<Vec<Permission>> {
        let group_id_str = group_id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id FROM type::record('group', $group_id); \
                 SELECT {PERMISSION_FIELDS} FROM permission \
                 WHERE in = type::record('group', $group_id) ORDER BY created_at ASC;"
            ))
            .bind(("group_id", group_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let group: Vec<RecordIdRow> = result.take(0).map_err(DbError::from)?;
        if group.is_empty() {
            return Err(DbError::NotFound {
                entity: "group".into(),
                id: group_id_str,
            }
            .into());
        }

        let rows: Vec<PermissionRow> = result.take(1).map_err(DbError::from)?;

        Ok(collect_permissions(rows)?)
    }
}
