//! Configuration types for Quarry.
//!
//! Configuration is loaded from a YAML file (`quarry.yaml`) which may point
//! at a separate schema descriptions file holding the overlay profiles.
//!
//! # Configuration Files
//!
//! - **quarry.yaml**: warehouse connection and dialect, catalog walk options,
//!   estimate thresholds
//! - **schema_descriptions.yaml**: per-profile table/column descriptions and
//!   visibility (see [`descriptions`])

pub mod descriptions;
pub mod estimates;
pub mod warehouse;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use descriptions::{ColumnOverlay, DescriptionsFile, OverlayScope, TableOverlay};
pub use estimates::{EstimateAssessment, EstimateThresholds, EstimatesConfig};
pub use warehouse::WarehouseConfig;

/// Complete Quarry configuration loaded from files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarryConfig {
    /// Warehouse connection and dialect.
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Path to the schema descriptions file.
    #[serde(default)]
    pub descriptions_file: Option<PathBuf>,

    /// Overlay profile selected from the descriptions file.
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Catalog walk options.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// EXPLAIN estimate thresholds.
    #[serde(default)]
    pub estimates: EstimatesConfig,

    /// Descriptions loaded from `descriptions_file` by [`QuarryConfig::load_with_context`].
    #[serde(skip)]
    pub descriptions: DescriptionsFile,
}

impl Default for QuarryConfig {
    fn default() -> Self {
        Self {
            warehouse: WarehouseConfig::default(),
            descriptions_file: None,
            profile: default_profile(),
            catalog: CatalogConfig::default(),
            estimates: EstimatesConfig::default(),
            descriptions: DescriptionsFile::default(),
        }
    }
}

/// Catalog walk options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Fetch sample rows for every visible table.
    #[serde(default)]
    pub with_examples: bool,

    /// Rows requested per sample query.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            with_examples: false,
            sample_rows: default_sample_rows(),
        }
    }
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_sample_rows() -> usize {
    5
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("profile '{profile}' not found in schema descriptions. Available profiles: {available}")]
    ProfileNotFound { profile: String, available: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl QuarryConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration and resolve the descriptions file relative to the
    /// config file's directory.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        if let Some(descriptions_file) = &config.descriptions_file {
            let descriptions_path = if descriptions_file.is_absolute() {
                descriptions_file.clone()
            } else {
                base_dir.join(descriptions_file)
            };

            if descriptions_path.exists() {
                config.descriptions = DescriptionsFile::from_file(&descriptions_path)?;
                tracing::debug!(
                    path = %descriptions_path.display(),
                    profile = %config.profile,
                    "loaded schema descriptions"
                );
            } else {
                return Err(ConfigError::Config(format!(
                    "Schema descriptions file not found: {}",
                    descriptions_path.display()
                )));
            }
        }

        Ok(config)
    }

    /// The overlay scope for the configured profile.
    ///
    /// Without a descriptions file the overlay is empty: every discovered
    /// table is visible with no descriptions.
    pub fn overlay(&self) -> Result<OverlayScope, ConfigError> {
        if self.descriptions_file.is_none() {
            return Ok(OverlayScope::default());
        }
        self.descriptions.profile(&self.profile).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn test_defaults() {
        let config = QuarryConfig::from_yaml("{}").unwrap();
        assert_eq!(config.profile, "default");
        assert_eq!(config.catalog.sample_rows, 5);
        assert!(!config.catalog.with_examples);
        assert_eq!(config.warehouse.dialect, Dialect::Unknown);
        assert!(config.overlay().unwrap().tables.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
warehouse:
  dialect: postgresql
  database_url: postgresql://u@localhost:5432/dwh
profile: analytics
catalog:
  with_examples: true
  sample_rows: 3
estimates:
  federated_warning: { rows: 100, size_gb: 1.5 }
"#;
        let config = QuarryConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.warehouse.dialect, Dialect::Postgres);
        assert_eq!(config.profile, "analytics");
        assert!(config.catalog.with_examples);
        assert_eq!(config.catalog.sample_rows, 3);
        assert_eq!(config.estimates.warning_for(Dialect::Trino).rows, 100);
        assert_eq!(config.estimates.warning_for(Dialect::ClickHouse).rows, 5_000_000_000);
    }

    #[test]
    fn test_load_with_context_resolves_descriptions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("schema_descriptions.yaml"),
            "profiles:\n  default:\n    tables:\n      orders:\n        description: Orders\n",
        )
        .unwrap();
        let config_path = dir.path().join("quarry.yaml");
        fs::write(
            &config_path,
            "warehouse:\n  dialect: clickhouse\ndescriptions_file: schema_descriptions.yaml\n",
        )
        .unwrap();

        let config = QuarryConfig::load_with_context(&config_path).unwrap();
        let overlay = config.overlay().unwrap();
        assert_eq!(
            overlay.tables["orders"].description.as_deref(),
            Some("Orders")
        );
    }

    #[test]
    fn test_load_with_context_missing_descriptions() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("quarry.yaml");
        fs::write(&config_path, "descriptions_file: nope.yaml\n").unwrap();

        let err = QuarryConfig::load_with_context(&config_path).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }
}
