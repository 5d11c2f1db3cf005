//! SurrealDB implementation of [`GroupRepository`].

use std::collections::HashMap;

use authorhub_core::error::AuthorHubResult;
use authorhub_core::models::group::{CreateGroup, Group, GroupDetail, UpdateGroup};
use authorhub_core::models::membership::Membership;
use authorhub_core::repository::GroupRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{
    MEMBERSHIP_FIELDS, MembershipRow, PERMISSION_FIELDS, PermissionRow, collect_memberships,
    collect_permissions, parse_uuid,
};
use crate::error::{DbError, check_response, not_found_marker};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct GroupRow {
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self, id: Uuid) -> Group {
        Group {
            id,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GroupRowWithId {
    record_id: String,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupRowWithId {
    fn try_into_group(self) -> Result<Group, DbError> {
        Ok(Group {
            id: parse_uuid(&self.record_id, "group")?,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Group repository.
#[derive(Clone)]
pub struct SurrealGroupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGroupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn membership(&self, user_id: Uuid, group_id: Uuid) -> AuthorHubResult<Membership> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {MEMBERSHIP_FIELDS} FROM member_of \
                 WHERE in = type::record('user', $user_id) \
                 AND out = type::record('group', $group_id)"
            ))
            .bind(("user_id", user_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let membership = collect_memberships(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "membership".into(),
                id: format!("{user_id}:{group_id}"),
            })?;

        Ok(membership)
    }
}

impl<C: Connection> GroupRepository for SurrealGroupRepository<C> {
    async fn create(&self, input: CreateGroup) -> AuthorHubResult<Group> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('group', $id) SET \
                 name = $name, description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response("group", result)?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "group".into(),
            id: id_str,
        })?;

        debug!(group_id = %id, "Group created");

        Ok(row.into_group(id))
    }

    async fn get_by_id(&self, id: Uuid) -> AuthorHubResult<Group> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('group', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "group".into(),
            id: id_str,
        })?;

        Ok(row.into_group(id))
    }

    async fn get_detail(&self, id: Uuid) -> AuthorHubResult<GroupDetail> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT * FROM type::record('group', $id); \
                 SELECT {MEMBERSHIP_FIELDS} FROM member_of \
                 WHERE out = type::record('group', $id) ORDER BY created_at ASC; \
                 SELECT {PERMISSION_FIELDS} FROM permission \
                 WHERE in = type::record('group', $id) ORDER BY created_at ASC;"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "group".into(),
            id: id_str,
        })?;
        let memberships: Vec<MembershipRow> = result.take(1).map_err(DbError::from)?;
        let permissions: Vec<PermissionRow> = result.take(2).map_err(DbError::from)?;

        Ok(GroupDetail {
            group: row.into_group(id),
            memberships: collect_memberships(memberships)?,
            permissions: collect_permissions(permissions)?,
        })
    }

    async fn update(&self, id: Uuid, input: UpdateGroup) -> AuthorHubResult<Group> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('group', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response("group", result)?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "group".into(),
            id: id_str,
        })?;

        Ok(row.into_group(id))
    }

    async fn delete(&self, id: Uuid) -> AuthorHubResult<()> {
        let id_str = id.to_string();
        let missing = not_found_marker("group", &id_str);

        // Memberships and grants go in the same transaction as the group.
        let query = format!(
            "BEGIN TRANSACTION; \
             IF !record::exists(type::record('group', $id)) {{ THROW '{missing}' }} \
             ELSE {{ \
                 DELETE member_of WHERE out = type::record('group', $id); \
                 DELETE permission WHERE in = type::record('group', $id); \
                 DELETE type::record('group', $id); \
             }}; \
             COMMIT TRANSACTION;"
        );

        let response = self
            .db
            .query(query)
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;
        check_response("group", response)?;

        debug!(group_id = %id, "Group deleted with memberships and permissions");

        Ok(())
    }

    async fn list(&self) -> AuthorHubResult<Vec<GroupDetail>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM group \
                 ORDER BY created_at ASC; \
                 SELECT {MEMBERSHIP_FIELDS} FROM member_of ORDER BY created_at ASC; \
                 SELECT {PERMISSION_FIELDS} FROM permission ORDER BY created_at ASC;"
            ))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRowWithId> = result.take(0).map_err(DbError::from)?;
        let memberships: Vec<MembershipRow> = result.take(1).map_err(DbError::from)?;
        let permissions: Vec<PermissionRow> = result.take(2).map_err(DbError::from)?;

        let mut members_by_group: HashMap<Uuid, Vec<_>> = HashMap::new();
        for membership in collect_memberships(memberships)? {
            members_by_group
                .entry(membership.group_id)
                .or_default()
                .push(membership);
        }
        let mut grants_by_group: HashMap<Uuid, Vec<_>> = HashMap::new();
        for permission in collect_permissions(permissions)? {
            grants_by_group
                .entry(permission.group_id)
                .or_default()
                .push(permission);
        }

        let groups = rows
            .into_iter()
            .map(|row| {
                let group = row.try_into_group()?;
                Ok(GroupDetail {
                    memberships: members_by_group.remove(&group.id).unwrap_or_default(),
                    permissions: grants_by_group.remove(&group.id).unwrap_or_default(),
                    group,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(groups)
    }

    async fn add_member(&self, user_id: Uuid, group_id: Uuid) -> AuthorHubResult<Membership> {
        let user_id_str = user_id.to_string();
        let group_id_str = group_id.to_string();
        let missing_user = not_found_marker("user", &user_id_str);
        let missing_group = not_found_marker("group", &group_id_str);

        // Existence checks and the edge insert commit together. Bumping
        // both endpoints makes a concurrent delete of either one a write
        // conflict; the unique pair index rejects a second edge.
        let query = format!(
            "BEGIN TRANSACTION; \
             IF !record::exists(type::record('user', $user_id)) {{ THROW '{missing_user}' }} \
             ELSE IF !record::exists(type::record('group', $group_id)) {{ THROW '{missing_group}' }} \
             ELSE {{ \
                 UPDATE type::record('user', $user_id) SET revision += 1; \
                 UPDATE type::record('group', $group_id) SET revision += 1; \
                 RELATE user:`{user_id_str}` -> member_of -> group:`{group_id_str}`; \
             }}; \
             COMMIT TRANSACTION;"
        );

        let response = self
            .db
            .query(query)
            .bind(("user_id", user_id_str))
            .bind(("group_id", group_id_str))
            .await
            .map_err(DbError::from)?;
        check_response("membership", response)?;

        debug!(%user_id, %group_id, "Membership created");

        self.membership(user_id, group_id).await
    }

    async fn remove_member(&self, user_id: Uuid, group_id: Uuid) -> AuthorHubResult<()> {
        let user_id_str = user_id.to_string();
        let group_id_str = group_id.to_string();
        let missing = not_found_marker("membership", &format!("{user_id_str}:{group_id_str}"));

        let query = format!(
            "BEGIN TRANSACTION; \
             IF array::len((SELECT VALUE id FROM member_of \
                 WHERE in = type::record('user', $user_id) \
                 AND out = type::record('group', $group_id))) = 0 \
             {{ THROW '{missing}' }} \
             ELSE {{ \
                 DELETE member_of WHERE \
                 in = type::record('user', $user_id) AND \
                 out = type::record('group', $group_id); \
             }}; \
             COMMIT TRANSACTION;"
        );

        let response = self
            .db
            .query(query)
            .bind(("user_id", user_id_str))
            .bind(("group_id", group_id_str))
            .await
            .map_err(DbError::from)?;
        check_response("membership", response)?;

        debug!(%user_id, %group_id, "Membership removed");

        Ok(())
    }
}
