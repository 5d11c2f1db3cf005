//! AuthorHub Server: application entry point.

use authorhub_server::config::ServerConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "authorhub_server=info,authorhub_db=info,authorhub_authz=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .json()
        .init();

    tracing::info!("Starting AuthorHub server...");

    let config = ServerConfig::from_env_or_yaml()?;
    authorhub_server::run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
