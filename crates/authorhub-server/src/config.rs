use std::fs;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use authorhub_db::DbConfig;
use serde::Deserialize;

pub const DEFAULT_BIND: &str = "0.0.0.0:3001";

// Server configuration sourced from environment variables, optionally
// overridden by a YAML file named in AUTHORHUB_CONFIG.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db: DbConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ServerConfigOverride {
    bind_addr: Option<String>,
    db: Option<DbConfigOverride>,
}

#[derive(Debug, Default, Deserialize)]
struct DbConfigOverride {
    url: Option<String>,
    namespace: Option<String>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("AUTHORHUB_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| "parse AUTHORHUB_BIND")?;

        let defaults = DbConfig::default();
        let db = DbConfig {
            url: std::env::var("AUTHORHUB_DB_URL").unwrap_or(defaults.url),
            namespace: std::env::var("AUTHORHUB_DB_NAMESPACE").unwrap_or(defaults.namespace),
            database: std::env::var("AUTHORHUB_DB_DATABASE").unwrap_or(defaults.database),
            username: std::env::var("AUTHORHUB_DB_USERNAME").ok(),
            password: std::env::var("AUTHORHUB_DB_PASSWORD").ok(),
        };

        Ok(Self { bind_addr, db })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("AUTHORHUB_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read AUTHORHUB_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: ServerConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse server config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(db) = override_cfg.db {
            if let Some(value) = db.url {
                self.db.url = value;
            }
            if let Some(value) = db.namespace {
                self.db.namespace = value;
            }
            if let Some(value) = db.database {
                self.db.database = value;
            }
            if db.username.is_some() {
                self.db.username = db.username;
            }
            if db.password.is_some() {
                self.db.password = db.password;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ServerConfig {
        ServerConfig {
            bind_addr: DEFAULT_BIND.parse().unwrap(),
            db: DbConfig::default(),
        }
    }

    #[test]
    fn yaml_overrides_selected_fields() {
        let mut config = base();
        config
            .apply_yaml(
                "bind_addr: 127.0.0.1:8080\n\
                 db:\n  url: ws://localhost:8000\n  namespace: staging\n",
            )
            .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.db.url, "ws://localhost:8000");
        assert_eq!(config.db.namespace, "staging");
        assert_eq!(config.db.database, "main");
        assert!(config.db.username.is_none());
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let mut config = base();
        let err = config.apply_yaml("bind_addr: not-an-address\n").unwrap_err();
        assert!(err.to_string().contains("bind_addr"));
    }
}
