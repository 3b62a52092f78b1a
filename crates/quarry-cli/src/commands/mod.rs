//! `quarry` subcommand implementations.

pub mod describe;
pub mod estimate;
pub mod input;
pub mod rewrite;
pub mod validate;

use std::path::Path;

use anyhow::Context as _;
use quarry_adapter_pg::PgWarehouseClient;
use quarry_core::{Dialect, QuarryConfig};

/// Loaded configuration plus the dialect every command works in.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: QuarryConfig,
    pub dialect: Dialect,
}

impl Settings {
    /// Load `config_path` (or defaults when absent) and apply the dialect
    /// override.
    pub fn load(config_path: Option<&Path>, dialect: Option<&str>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => QuarryConfig::load_with_context(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => QuarryConfig::default(),
        };

        let dialect = match dialect {
            Some(name) => Dialect::from_name(name),
            None => config.warehouse.effective_dialect(),
        };
        if dialect.is_unknown() {
            tracing::debug!("no dialect configured, using generic behaviour");
        }

        Ok(Self { config, dialect })
    }
}

/// Open the configured warehouse. Only Postgres connections are available;
/// other dialects still drive the SQL generated against it.
pub async fn connect(settings: &Settings) -> anyhow::Result<PgWarehouseClient> {
    if settings.dialect != Dialect::Postgres {
        tracing::warn!(
            dialect = %settings.dialect,
            "connecting with the Postgres client, dialect rules still apply"
        );
    }
    PgWarehouseClient::connect(&settings.config.warehouse)
        .await
        .context("failed to connect to the warehouse")
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_dialect_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry.yaml");
        fs::write(&path, "warehouse:\n  dialect: clickhouse\n").unwrap();

        let settings = Settings::load(Some(&path), None).unwrap();
        assert_eq!(settings.dialect, Dialect::ClickHouse);

        let settings = Settings::load(Some(&path), Some("trino")).unwrap();
        assert_eq!(settings.dialect, Dialect::Trino);
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = Settings::load(None, None).unwrap();
        assert_eq!(settings.dialect, Dialect::Unknown);
        assert_eq!(settings.config.profile, "default");
    }

    #[test]
    fn test_missing_config_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/quarry.yaml")), None).unwrap_err();
        assert!(err.to_string().contains("quarry.yaml"));
    }
}
