//! Read-side loader feeding the evaluator and the aggregator.

use authorhub_core::error::AuthorHubResult;
use authorhub_core::models::access::{GroupRef, UserAccess};
use authorhub_core::repository::AccessRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{PERMISSION_FIELDS, PermissionRow, RecordIdRow, collect_permissions, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct GroupRefRow {
    record_id: String,
    name: Option<String>,
}

/// Loads a user's groups and the permissions they hold in one round trip.
#[derive(Clone)]
pub struct SurrealAccessRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccessRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AccessRepository for SurrealAccessRepository<C> {
    async fn load_user_access(&self, user_id: Uuid) -> AuthorHubResult<UserAccess> {
        let user_id_str = user_id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id FROM type::record('user', $user_id); \
                 SELECT meta::id(out) AS record_id, out.name AS name FROM member_of \
                 WHERE in = type::record('user', $user_id) ORDER BY name ASC; \
                 SELECT {PERMISSION_FIELDS} FROM permission \
                 WHERE in IN (SELECT VALUE out FROM member_of \
                     WHERE in = type::record('user', $user_id)) \
                 ORDER BY group_name ASC, created_at ASC;"
            ))
            .bind(("user_id", user_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let user: Vec<RecordIdRow> = result.take(0).map_err(DbError::from)?;
        if user.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: user_id_str,
            }
            .into());
        }

        let group_rows: Vec<GroupRefRow> = result.take(1).map_err(DbError::from)?;
        let grant_rows: Vec<PermissionRow> = result.take(2).map_err(DbError::from)?;

        // Edges to a vanished group are left out.
        let groups = group_rows
            .into_iter()
            .filter_map(|row| {
                let name = row.name?;
                Some(parse_uuid(&row.record_id, "group").map(|id| GroupRef { id, name }))
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(UserAccess {
            user_id,
            groups,
            grants: collect_permissions(grant_rows)?,
        })
    }
}
