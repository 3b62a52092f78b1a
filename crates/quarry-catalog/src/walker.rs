//! Catalog → schema → table → column traversal.
//!
//! Every step is an independent call against the warehouse. A failing step
//! prunes its own branch (logged and recorded in
//! [`SchemaSnapshot::pruned`]) and the walk carries on with the siblings.

use std::fmt;

use quarry_core::{
    CatalogConfig, CatalogMode, CatalogPath, ColumnDescriptor, Dialect, OverlayScope, RowSet,
    TableDescriptor, WarehouseClient,
};
use serde::Serialize;

use crate::overlay::{apply_to_columns, resolve, table_visibility};
use crate::sample::{project_visible, sample_query};

/// Table name prefixes for internal and temporary tables.
const RESERVED_TABLE_PREFIXES: &[&str] = &["_", "temp_"];

/// Step of the walk at which a branch was pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkStep {
    Catalogs,
    Schemas,
    Tables,
    Columns,
    Sample,
}

impl fmt::Display for WalkStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WalkStep::Catalogs => "catalogs",
            WalkStep::Schemas => "schemas",
            WalkStep::Tables => "tables",
            WalkStep::Columns => "columns",
            WalkStep::Sample => "sample",
        };
        f.write_str(name)
    }
}

/// A branch dropped because its step failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrunedBranch {
    pub step: WalkStep,
    /// Dotted path of the failing node, or `<root>`.
    pub path: String,
    pub error: String,
}

/// One visible table in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotTable {
    /// `schema.table` or `table`.
    pub name: String,
    pub path: CatalogPath,
    pub table: TableDescriptor,
    /// Set when column introspection failed; `table.columns` is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<RowSet>,
}

/// Result of a full walk, tables in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaSnapshot {
    pub dialect: Dialect,
    pub tables: Vec<SnapshotTable>,
    pub pruned: Vec<PrunedBranch>,
}

impl SchemaSnapshot {
    /// First table whose display name is `name`.
    pub fn get(&self, name: &str) -> Option<&SnapshotTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }
}

/// Walks one warehouse through a borrowed client.
pub struct CatalogWalker<'a> {
    client: &'a dyn WarehouseClient,
    dialect: Dialect,
    overlay: &'a OverlayScope,
    options: CatalogConfig,
}

impl<'a> CatalogWalker<'a> {
    pub fn new(client: &'a dyn WarehouseClient, dialect: Dialect, overlay: &'a OverlayScope) -> Self {
        Self {
            client,
            dialect,
            overlay,
            options: CatalogConfig::default(),
        }
    }

    pub fn with_options(mut self, options: CatalogConfig) -> Self {
        self.options = options;
        self
    }

    // ===== CATALOGS =====

    /// Catalogs to walk. `None` stands for "no catalog level".
    pub async fn list_catalogs(&self) -> Vec<Option<String>> {
        self.list_catalogs_inner(&mut Vec::new()).await
    }

    async fn list_catalogs_inner(&self, pruned: &mut Vec<PrunedBranch>) -> Vec<Option<String>> {
        match self.dialect.catalog_mode() {
            CatalogMode::Federated => {
                let command = self.dialect.list_catalogs_command().unwrap_or("SHOW CATALOGS");
                match self.client.query(command).await {
                    Ok(rows) => {
                        let catalogs: Vec<Option<String>> = rows
                            .first_column_strings()
                            .into_iter()
                            .filter(|c| !self.dialect.is_system_catalog(c))
                            .map(Some)
                            .collect();
                        non_empty_or_sentinel(catalogs)
                    }
                    Err(e) => {
                        let fallback = self
                            .client
                            .configured_database()
                            .and_then(|db| db.split('/').next().map(str::to_string))
                            .filter(|db| !db.is_empty());
                        tracing::warn!(
                            step = %WalkStep::Catalogs,
                            error = %e,
                            fallback = ?fallback,
                            "catalog listing failed, using configured database"
                        );
                        prune(pruned, WalkStep::Catalogs, "<root>", &e);
                        vec![fallback]
                    }
                }
            }
            CatalogMode::DatabaseAsCatalog => vec![
                self.client
                    .configured_database()
                    .filter(|db| !db.is_empty()),
            ],
            CatalogMode::None => vec![None],
        }
    }

    // ===== SCHEMAS =====

    /// Schemas of `catalog` after the system-schema denylist. `None` stands
    /// for "no schema level".
    pub async fn list_schemas(&self, catalog: Option<&str>) -> Vec<Option<String>> {
        self.list_schemas_inner(catalog, &mut Vec::new()).await
    }

    async fn list_schemas_inner(
        &self,
        catalog: Option<&str>,
        pruned: &mut Vec<PrunedBranch>,
    ) -> Vec<Option<String>> {
        let native = match (catalog, catalog.and_then(|c| self.dialect.list_schemas_command(c))) {
            (Some(catalog), Some(command)) => match self.client.query(&command).await {
                Ok(rows) => Some(rows.first_column_strings()),
                Err(e) => {
                    tracing::warn!(
                        step = %WalkStep::Schemas,
                        catalog,
                        error = %e,
                        "native schema listing failed, falling back to introspection"
                    );
                    None
                }
            },
            _ => None,
        };

        let listed = match native {
            Some(schemas) => schemas,
            None => match self.client.schema_names().await {
                Ok(schemas) => schemas,
                Err(e) => {
                    let path = catalog.unwrap_or("<root>");
                    tracing::warn!(step = %WalkStep::Schemas, path, error = %e, "schema listing failed");
                    prune(pruned, WalkStep::Schemas, path, &e);
                    Vec::new()
                }
            },
        };

        let schemas = listed
            .into_iter()
            .filter(|s| !s.is_empty() && !self.dialect.is_system_schema(s))
            .map(Some)
            .collect();
        non_empty_or_sentinel(schemas)
    }

    // ===== TABLES AND COLUMNS =====

    /// Tables of one schema, reserved prefixes removed.
    pub async fn list_tables(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> anyhow::Result<Vec<String>> {
        let native = match (catalog, schema) {
            (Some(c), Some(s)) => self.dialect.list_tables_command(c, s),
            _ => None,
        };

        let tables = match native {
            Some(command) => self.client.query(&command).await?.first_column_strings(),
            None => self.client.table_names(schema).await?,
        };

        Ok(tables
            .into_iter()
            .filter(|t| !RESERVED_TABLE_PREFIXES.iter().any(|p| t.starts_with(p)))
            .collect())
    }

    /// Columns of one table in introspection order.
    pub async fn list_columns(&self, path: &CatalogPath) -> anyhow::Result<Vec<ColumnDescriptor>> {
        let native = match (&path.catalog, &path.schema) {
            (Some(c), Some(s)) => self.dialect.describe_table_command(c, s, &path.table),
            _ => None,
        };

        match native {
            Some(command) => {
                let rows = self.client.query(&command).await?;
                Ok(rows
                    .rows
                    .iter()
                    .filter_map(|row| {
                        let name = row.first()?.as_str()?;
                        let data_type = row.get(1).and_then(|v| v.as_str()).unwrap_or_default();
                        Some(ColumnDescriptor::new(name, data_type))
                    })
                    .collect())
            }
            None => self.client.columns(&path.table, path.schema.as_deref()).await,
        }
    }

    /// Sample rows of a table with hidden columns projected away.
    pub async fn sample(&self, path: &CatalogPath, table: &TableDescriptor) -> anyhow::Result<RowSet> {
        let sql = sample_query(self.dialect, path, self.options.sample_rows);
        let rows = self.client.query(&sql).await?;
        let hidden = self.hidden_column_names(path, table);
        Ok(project_visible(rows, |name| hidden.iter().any(|h| h == name)))
    }

    fn hidden_column_names(&self, path: &CatalogPath, table: &TableDescriptor) -> Vec<String> {
        let mut hidden: Vec<String> = table
            .columns
            .iter()
            .filter(|c| c.hidden)
            .map(|c| c.name.clone())
            .collect();
        // Columns the sample returns but introspection did not report.
        if let Some(entry) = resolve(self.overlay, path) {
            hidden.extend(
                entry
                    .columns
                    .iter()
                    .filter(|(_, c)| c.hidden)
                    .map(|(name, _)| name.clone()),
            );
        }
        hidden
    }

    // ===== WALK =====

    /// Walk every catalog, schema and table into a snapshot.
    pub async fn walk(&self) -> SchemaSnapshot {
        let mut pruned = Vec::new();
        let mut tables = Vec::new();

        for catalog in self.list_catalogs_inner(&mut pruned).await {
            let catalog = catalog.as_deref();
            for schema in self.list_schemas_inner(catalog, &mut pruned).await {
                let schema = schema.as_deref();
                let table_names = match self.list_tables(catalog, schema).await {
                    Ok(names) => names,
                    Err(e) => {
                        let path = dotted(&[catalog, schema]);
                        tracing::warn!(step = %WalkStep::Tables, path = %path, error = %e, "skipping schema");
                        prune(&mut pruned, WalkStep::Tables, &path, &e);
                        continue;
                    }
                };
                tracing::debug!(catalog = ?catalog, schema = ?schema, tables = table_names.len(), "listed tables");

                for name in table_names {
                    let path = CatalogPath::new(catalog, schema, name);
                    if let Some(table) = self.describe(&path, &mut pruned).await {
                        tables.push(table);
                    }
                }
            }
        }

        tracing::info!(
            dialect = %self.dialect,
            tables = tables.len(),
            pruned = pruned.len(),
            "catalog walk finished"
        );

        SchemaSnapshot {
            dialect: self.dialect,
            tables,
            pruned,
        }
    }

    /// Build the snapshot entry for one table, or `None` if it is not visible.
    async fn describe(&self, path: &CatalogPath, pruned: &mut Vec<PrunedBranch>) -> Option<SnapshotTable> {
        let resolved = resolve(self.overlay, path);
        let visibility = table_visibility(self.overlay, resolved);
        if !visibility.is_visible() {
            tracing::debug!(table = %path.fqn(), ?visibility, "table not visible");
            return None;
        }

        let (columns, columns_error) = match self.list_columns(path).await {
            Ok(columns) => (apply_to_columns(columns, resolved), None),
            Err(e) => {
                tracing::warn!(step = %WalkStep::Columns, table = %path.fqn(), error = %e, "column listing failed");
                prune(pruned, WalkStep::Columns, &path.fqn(), &e);
                (Vec::new(), Some(e.to_string()))
            }
        };

        let table = TableDescriptor {
            columns,
            description: resolved.and_then(|entry| entry.description.clone()),
            hidden: false,
            whitelisted: resolved.is_some(),
        };

        let sample = if self.options.with_examples && columns_error.is_none() {
            match self.sample(path, &table).await {
                Ok(rows) => Some(rows),
                Err(e) => {
                    tracing::warn!(step = %WalkStep::Sample, table = %path.fqn(), error = %e, "sample query failed");
                    prune(pruned, WalkStep::Sample, &path.fqn(), &e);
                    None
                }
            }
        } else {
            None
        };

        Some(SnapshotTable {
            name: path.display_name(),
            path: path.clone(),
            table,
            columns_error,
            sample,
        })
    }
}

fn non_empty_or_sentinel(items: Vec<Option<String>>) -> Vec<Option<String>> {
    if items.is_empty() { vec![None] } else { items }
}

fn dotted(parts: &[Option<&str>]) -> String {
    let joined: Vec<&str> = parts.iter().flatten().copied().collect();
    if joined.is_empty() {
        "<root>".to_string()
    } else {
        joined.join(".")
    }
}

fn prune(pruned: &mut Vec<PrunedBranch>, step: WalkStep, path: &str, error: &anyhow::Error) {
    pruned.push(PrunedBranch {
        step,
        path: path.to_string(),
        error: error.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted() {
        assert_eq!(dotted(&[Some("hive"), Some("sales")]), "hive.sales");
        assert_eq!(dotted(&[None, Some("public")]), "public");
        assert_eq!(dotted(&[None, None]), "<root>");
    }

    #[test]
    fn test_sentinel() {
        assert_eq!(non_empty_or_sentinel(Vec::new()), vec![None]);
        assert_eq!(
            non_empty_or_sentinel(vec![Some("a".into())]),
            vec![Some("a".to_string())]
        );
    }
}
