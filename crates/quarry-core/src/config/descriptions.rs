//! Schema description overlay.
//!
//! Human-authored table and column descriptions merged over live
//! introspection. The file is organised by profile:
//!
//! ```yaml
//! profiles:
//!   default:
//!     whitelist: false
//!     tables:
//!       public.orders:
//!         description: "Customer orders"
//!         columns:
//!           amount: { description: "Order total", example: "19.99" }
//!           internal_note: { hidden: true }
//! ```
//!
//! Table keys may be `catalog.schema.table`, `schema.table` or `table`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::ConfigError;

/// The whole overlay file: one scope per profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptionsFile {
    #[serde(default)]
    pub profiles: Option<HashMap<String, OverlayScope>>,
}

impl DescriptionsFile {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Select a profile's overlay scope.
    pub fn profile(&self, name: &str) -> Result<&OverlayScope, ConfigError> {
        let profiles = self.profiles.as_ref().ok_or_else(|| {
            ConfigError::Config("schema descriptions file is missing the 'profiles' key".into())
        })?;

        profiles.get(name).ok_or_else(|| {
            let mut available: Vec<&str> = profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            ConfigError::ProfileNotFound {
                profile: name.to_string(),
                available: available.join(", "),
            }
        })
    }
}

/// Overlay for one profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayScope {
    /// When set, only tables with an explicit entry are visible.
    #[serde(default)]
    pub whitelist: bool,

    #[serde(default)]
    pub tables: HashMap<String, TableOverlay>,
}

impl OverlayScope {
    /// Builder-style helper used by callers assembling overlays in code.
    pub fn with_table(mut self, key: impl Into<String>, table: TableOverlay) -> Self {
        self.tables.insert(key.into(), table);
        self
    }
}

/// Overlay entry for a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub columns: HashMap<String, ColumnOverlay>,
}

impl TableOverlay {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnOverlay> {
        self.columns.get(name)
    }

    /// Whether the overlay hides this column.
    pub fn is_column_hidden(&self, name: &str) -> bool {
        self.column(name).map(|c| c.hidden).unwrap_or(false)
    }
}

/// Overlay entry for a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Example value; numbers and booleans are kept as their text form.
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<String>,

    #[serde(default)]
    pub hidden: bool,
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_yaml::Value::Null) => None,
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => serde_yaml::to_string(&other).ok().map(|s| s.trim().to_string()),
    })
}
