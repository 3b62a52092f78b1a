//! Data model shared by the rewriter, validators and catalog walker.
//!
//! Everything here is created fresh per call; nothing carries identity
//! across calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A column as produced by live introspection, enriched by the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,

    #[serde(default)]
    pub hidden: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            description: None,
            example: None,
            hidden: false,
        }
    }
}

/// A table with its columns in introspection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Columns keyed by name; order follows introspection.
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub whitelisted: bool,
}

impl TableDescriptor {
    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns not marked hidden.
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.hidden)
    }
}

/// Location of a table in the catalog → schema → table hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogPath {
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    pub table: String,
}

impl CatalogPath {
    pub fn new(catalog: Option<&str>, schema: Option<&str>, table: impl Into<String>) -> Self {
        Self {
            catalog: catalog.map(str::to_string),
            schema: schema.map(str::to_string),
            table: table.into(),
        }
    }

    /// Overlay lookup keys, most specific first:
    /// `catalog.schema.table`, `schema.table`, `table`.
    pub fn lookup_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(3);
        if let (Some(catalog), Some(schema)) = (&self.catalog, &self.schema) {
            keys.push(format!("{}.{}.{}", catalog, schema, self.table));
        }
        if let Some(schema) = &self.schema {
            keys.push(format!("{}.{}", schema, self.table));
        }
        keys.push(self.table.clone());
        keys
    }

    /// Name used as the snapshot key and in rendered text: `schema.table`
    /// or just `table`.
    pub fn display_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }

    /// Fully-qualified name including every known level.
    pub fn fqn(&self) -> String {
        match (&self.catalog, &self.schema) {
            (Some(catalog), Some(schema)) => format!("{}.{}.{}", catalog, schema, self.table),
            _ => self.display_name(),
        }
    }
}

/// Row and size estimates parsed from an engine's plan output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPlanEstimate {
    pub estimated_rows: Option<u64>,
    pub estimated_size_gb: Option<f64>,
}

impl QueryPlanEstimate {
    pub fn is_empty(&self) -> bool {
        self.estimated_rows.is_none() && self.estimated_size_gb.is_none()
    }
}

/// Outcome of comparing declared output columns against the SQL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub sql_columns: Vec<String>,
    pub metadata_columns: Vec<String>,
}

impl ValidationResult {
    /// An invalid result carrying a single error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

/// Sort direction for the outer ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `asc` (case-insensitive) sorts descending.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A declared output column, normalised from whichever representation the
/// caller holds: a typed [`ColumnDescriptor`] or a loose JSON object with a
/// `column_name` or `name` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredColumn {
    /// Identifier used in diagnostics when the name is missing.
    pub id: Option<String>,
    pub name: Option<String>,
    pub data_type: Option<String>,
    pub hidden: bool,
}

impl DeclaredColumn {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The declared name, if present and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Normalise a list of JSON column objects.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Vec<Self> {
        values.into_iter().map(DeclaredColumn::from).collect()
    }
}

impl From<&ColumnDescriptor> for DeclaredColumn {
    fn from(column: &ColumnDescriptor) -> Self {
        Self {
            id: None,
            name: Some(column.name.clone()),
            data_type: Some(column.data_type.clone()),
            hidden: column.hidden,
        }
    }
}

impl From<ColumnDescriptor> for DeclaredColumn {
    fn from(column: ColumnDescriptor) -> Self {
        DeclaredColumn::from(&column)
    }
}

impl From<&Value> for DeclaredColumn {
    fn from(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(|v| v.as_str()).map(str::to_string);

        let id = match value.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Self {
            id,
            name: text("column_name").or_else(|| text("name")),
            data_type: text("type").or_else(|| text("data_type")),
            hidden: value.get("hidden").and_then(|v| v.as_bool()).unwrap_or(false),
        }
    }
}

/// Rows returned by the external database client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Each row as a column-name → value object.
    pub fn records(&self) -> Vec<serde_json::Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// First column of every row rendered as text, as returned by
    /// `SHOW ...` listing commands.
    pub fn first_column_strings(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .filter_map(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect()
    }
}
