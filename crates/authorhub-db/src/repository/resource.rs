//! SurrealDB implementation of [`ResourceRepository`].

use std::collections::HashMap;

use authorhub_core::error::AuthorHubResult;
use authorhub_core::models::resource::{
    CreateResource, Resource, ResourceDetail, UpdateResource,
};
use authorhub_core::repository::ResourceRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{PERMISSION_FIELDS, PermissionRow, collect_permissions, parse_uuid};
use crate::error::{DbError, check_response, not_found_marker};

#[derive(Debug, SurrealValue)]
struct ResourceRow {
    key: String,
    name: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ResourceRowWithId {
    record_id: String,
    key: String,
    name: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceRow {
    fn into_resource(self, id: Uuid) -> Resource {
        Resource {
            id,
            key: self.key,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ResourceRowWithId {
    fn try_into_resource(self) -> Result<Resource, DbError> {
        Ok(Resource {
            id: parse_uuid(&self.record_id, "resource")?,
            key: self.key,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Resource repository.
#[derive(Clone)]
pub struct SurrealResourceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealResourceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ResourceRepository for SurrealResourceRepository<C> {
    async fn create(&self, input: CreateResource) -> AuthorHubResult<Resource> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('resource', $id) SET \
                 key = $key, name = $name, description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("key", input.key))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response("resource", result)?;

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "resource".into(),
            id: id_str,
        })?;

        debug!(resource_id = %id, "Resource created");

        Ok(row.into_resource(id))
    }

    async fn get_by_id(&self, id: Uuid) -> AuthorHubResult<Resource> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('resource', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "resource".into(),
            id: id_str,
        })?;

        Ok(row.into_resource(id))
    }

    async fn get_detail(&self, id: Uuid) -> AuthorHubResult<ResourceDetail> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT * FROM type::record('resource', $id); \
                 SELECT {PERMISSION_FIELDS} FROM permission \
                 WHERE out = type::record('resource', $id) ORDER BY created_at ASC;"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "resource".into(),
            id: id_str,
        })?;
        let permissions: Vec<PermissionRow> = result.take(1).map_err(DbError::from)?;

        Ok(ResourceDetail {
            resource: row.into_resource(id),
            permissions: collect_permissions(permissions)?,
        })
    }

    async fn update(&self, id: Uuid, input: UpdateResource) -> AuthorHubResult<Resource> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.key.is_some() {
            sets.push("key = $key");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('resource', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(key) = input.key {
            builder = builder.bind(("key", key));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response("resource", result)?;

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "resource".into(),
            id: id_str,
        })?;

        Ok(row.into_resource(id))
    }

    async fn delete(&self, id: Uuid) -> AuthorHubResult<()> {
        let id_str = id.to_string();
        let missing = not_found_marker("resource", &id_str);

        let query = format!(
            "BEGIN TRANSACTION; \
             IF !record::exists(type::record('resource', $id)) {{ THROW '{missing}' }} \
             ELSE {{ \
                 DELETE permission WHERE out = type::record('resource', $id); \
                 DELETE type::record('resource', $id); \
             }}; \
             COMMIT TRANSACTION;"
        );

        let response = self
            .db
            .query(query)
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;
        check_response("resource", response)?;

        debug!(resource_id = %id, "Resource deleted with permissions");

        Ok(())
    }

    async fn list(&self) -> AuthorHubResult<Vec<ResourceDetail>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM resource \
                 ORDER BY created_at ASC; \
                 SELECT {PERMISSION_FIELDS} FROM permission ORDER BY created_at ASC;"
            ))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceRowWithId> = result.take(0).map_err(DbError::from)?;
        let permissions: Vec<PermissionRow> = result.take(1).map_err(DbError::from)?;

        let mut by_resource: HashMap<Uuid, Vec<_>> = HashMap::new();
        for permission in collect_permissions(permissions)? {
            by_resource
                .entry(permission.resource_id)
                .or_default()
                .push(permission);
        }

        let resources = rows
            .into_iter()
            .map(|row| {
                let resource = row.try_into_resource()?;
                Ok(ResourceDetail {
                    permissions: by_resource.remove(&resource.id).unwrap_or_default(),
                    resource,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(resources)
    }
}
