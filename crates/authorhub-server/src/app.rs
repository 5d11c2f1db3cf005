//! HTTP application wiring.
//!
//! Builds the axum router, configures middleware, and defines the
//! shared state injected into handlers.

use authorhub_authz::{PermissionAggregator, PermissionEvaluator};
use authorhub_db::repository::{
    SurrealAccessRepository, SurrealGroupRepository, SurrealPermissionRepository,
    SurrealResourceRepository, SurrealUserRepository,
};
use axum::Router;
use axum::routing::{get, post, put};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;

/// Repositories and services over one store handle. Every field is a
/// cheap clone of the same underlying connection.
#[derive(Clone)]
pub struct AppState {
    pub users: SurrealUserRepository<Any>,
    pub groups: SurrealGroupRepository<Any>,
    pub resources: SurrealResourceRepository<Any>,
    pub permissions: SurrealPermissionRepository<Any>,
    pub evaluator: PermissionEvaluator<SurrealAccessRepository<Any>>,
    pub aggregator: PermissionAggregator<SurrealAccessRepository<Any>>,
}

impl AppState {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            users: SurrealUserRepository::new(db.clone()),
            groups: SurrealGroupRepository::new(db.clone()),
            resources: SurrealResourceRepository::new(db.clone()),
            permissions: SurrealPermissionRepository::new(db.clone()),
            evaluator: PermissionEvaluator::new(SurrealAccessRepository::new(db.clone())),
            aggregator: PermissionAggregator::new(SurrealAccessRepository::new(db)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
            )
        });

    Router::new()
        .route("/health", get(api::system::health))
        .route(
            "/api/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/api/users/{id}",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        .route(
            "/api/groups",
            get(api::groups::list_groups).post(api::groups::create_group),
        )
        .route(
            "/api/groups/{id}",
            get(api::groups::get_group)
                .put(api::groups::update_group)
                .delete(api::groups::delete_group),
        )
        .route("/api/groups/{id}/users", post(api::groups::add_member))
        .route(
            "/api/groups/{id}/users/{user_id}",
            axum::routing::delete(api::groups::remove_member),
        )
        .route(
            "/api/resources",
            get(api::resources::list_resources).post(api::resources::create_resource),
        )
        .route(
            "/api/resources/{id}",
            get(api::resources::get_resource)
                .put(api::resources::update_resource)
                .delete(api::resources::delete_resource),
        )
        .route("/api/permissions", get(api::permissions::list_permissions))
        .route(
            "/api/permissions/check",
            get(api::permissions::check_permission),
        )
        .route(
            "/api/permissions/user/{user_id}",
            get(api::permissions::effective_permissions),
        )
        .route(
            "/api/permissions/groups/{group_id}",
            get(api::permissions::list_group_permissions)
                .post(api::permissions::create_permission),
        )
        .route(
            "/api/permissions/groups/{group_id}/resources/{resource_id}",
            put(api::permissions::update_permission)
                .delete(api::permissions::delete_permission),
        )
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
