//! SurrealDB implementation of [`UserRepository`].

use std::collections::HashMap;

use authorhub_core::error::AuthorHubResult;
use authorhub_core::models::user::{CreateUser, UpdateUser, User, UserDetail};
use authorhub_core::repository::UserRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{MEMBERSHIP_FIELDS, MembershipRow, collect_memberships, parse_uuid};
use crate::error::{DbError, check_response, not_found_marker};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    email: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    username: String,
    email: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid(&self.record_id, "user")?,
            username: self.username,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> AuthorHubResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, email = $email, name = $name",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response("user", result)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        debug!(user_id = %id, "User created");

        Ok(row.into_user(id))
    }

    async fn get_by_id(&self, id: Uuid) -> AuthorHubResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn get_detail(&self, id: Uuid) -> AuthorHubResult<UserDetail> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT * FROM type::record('user', $id); \
                 SELECT {MEMBERSHIP_FIELDS} FROM member_of \
                 WHERE in = type::record('user', $id) ORDER BY created_at ASC;"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;
        let memberships: Vec<MembershipRow> = result.take(1).map_err(DbError::from)?;

        Ok(UserDetail {
            user: row.into_user(id),
            memberships: collect_memberships(memberships)?,
        })
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> AuthorHubResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.username.is_some() {
            sets.push("username = $username");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('user', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(username) = input.username {
            builder = builder.bind(("username", username));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response("user", result)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        debug!(user_id = %id, "User updated");

        Ok(row.into_user(id))
    }

    async fn delete(&self, id: Uuid) -> AuthorHubResult<()> {
        let id_str = id.to_string();
        let missing = not_found_marker("user", &id_str);

        let query = format!(
            "BEGIN TRANSACTION; \
             IF !record::exists(type::record('user', $id)) {{ THROW '{missing}' }} \
             ELSE {{ \
                 DELETE member_of WHERE in = type::record('user', $id); \
                 DELETE type::record('user', $id); \
             }}; \
             COMMIT TRANSACTION;"
        );

        let response = self
            .db
            .query(query)
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;
        check_response("user", response)?;

        debug!(user_id = %id, "User deleted with memberships");

        Ok(())
    }

    async fn list(&self) -> AuthorHubResult<Vec<UserDetail>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC; \
                 SELECT {MEMBERSHIP_FIELDS} FROM member_of ORDER BY created_at ASC;"
            ))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let memberships: Vec<MembershipRow> = result.take(1).map_err(DbError::from)?;

        let mut by_user: HashMap<Uuid, Vec<_>> = HashMap::new();
        for membership in collect_memberships(memberships)? {
            by_user.entry(membership.user_id).or_default().push(membership);
        }

        let users = rows
            .into_iter()
            .map(|row| {
                let user = row.try_into_user()?;
                Ok(UserDetail {
                    memberships: by_user.remove(&user.id).unwrap_or_default(),
                    user,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }
}
