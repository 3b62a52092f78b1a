//! Warehouse connection configuration.
//!
//! Two configuration methods are supported:
//! 1. `database_url` - provide the URL directly
//! 2. Individual fields (host, port, database, username, password)

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

/// Configuration for the warehouse connection and its dialect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Engine dialect. Aliases such as `postgresql` or `tsql` are accepted.
    #[serde(default)]
    pub dialect: Dialect,

    /// Driver string (e.g. `clickhouse+native`), used to detect the dialect
    /// when `dialect` is not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,

    /// Full connection URL. Takes precedence over individual fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name. For federated engines this may be `catalog/schema`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Maximum connections held by the adapter pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Unknown,
            driver: None,
            database_url: None,
            host: default_host(),
            port: default_port(),
            database: None,
            username: default_username(),
            password: None,
            max_connections: default_max_connections(),
        }
    }
}

impl WarehouseConfig {
    /// The configured dialect, or the one detected from `driver`.
    pub fn effective_dialect(&self) -> Dialect {
        match (&self.dialect, &self.driver) {
            (Dialect::Unknown, Some(driver)) => Dialect::from_driver(driver),
            (dialect, _) => *dialect,
        }
    }

    /// Build a connection string from this configuration.
    pub fn connection_string(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }

        let database = self.database.as_deref().unwrap_or_default();
        match &self.password {
            Some(password) => format!(
                "postgresql://{}:{}@{}:{}/{}",
                self.username, password, self.host, self.port, database
            ),
            None => format!(
                "postgresql://{}@{}:{}/{}",
                self.username, self.host, self.port, database
            ),
        }
    }

    /// Database named by this configuration: the explicit field, else the
    /// URL path.
    pub fn database_name(&self) -> Option<String> {
        self.database
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| self.database_url.as_deref().and_then(database_from_url))
    }
}

/// Extract the path component of a connection URL
/// (`scheme://user@host:port/<path>?params`).
pub fn database_from_url(url: &str) -> Option<String> {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let (_, path) = rest.split_once('/')?;
    let path = path.split(['?', '#']).next().unwrap_or_default();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_username() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    5
}
