//! AuthorHub Server: HTTP admin API over the AuthorHub store.

pub mod api;
pub mod app;
pub mod config;

use std::future::Future;

use anyhow::Context;
use authorhub_db::{DbManager, run_migrations};

use crate::app::{AppState, build_router};
use crate::config::ServerConfig;

/// Open the store, apply migrations and serve until `shutdown` resolves.
pub async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let manager = DbManager::connect(&config.db)
        .await
        .context("connect to SurrealDB")?;
    run_migrations(manager.client())
        .await
        .context("apply schema migrations")?;

    let app = build_router(AppState::new(manager.client().clone()));

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "AuthorHub API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("serve HTTP")?;

    tracing::info!("AuthorHub API stopped");
    Ok(())
}
