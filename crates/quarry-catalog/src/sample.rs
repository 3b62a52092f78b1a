//! Sample-row queries and visible-column projection.

use quarry_core::{CatalogMode, CatalogPath, Dialect, RowSet};
use serde_json::Value;

/// Table reference used in query text.
///
/// Federated engines need the catalog to resolve a table; everywhere else
/// the catalog level is the connected database and is left implicit.
pub fn query_table_name(dialect: Dialect, path: &CatalogPath) -> String {
    match dialect.catalog_mode() {
        CatalogMode::Federated => path.fqn(),
        CatalogMode::DatabaseAsCatalog | CatalogMode::None => path.display_name(),
    }
}

/// Dialect-appropriate sampling query for `path`.
pub fn sample_query(dialect: Dialect, path: &CatalogPath, limit: usize) -> String {
    dialect.sample_query(&query_table_name(dialect, path), limit)
}

/// Keep only columns for which `is_hidden` is false.
///
/// Positions are computed against the original column list, so a row keeps
/// each value under its own column even when earlier columns are dropped.
pub fn project_visible(rows: RowSet, is_hidden: impl Fn(&str) -> bool) -> RowSet {
    let visible: Vec<(usize, String)> = rows
        .columns
        .into_iter()
        .enumerate()
        .filter(|(_, name)| !is_hidden(name))
        .collect();

    let projected = rows
        .rows
        .into_iter()
        .map(|row| {
            visible
                .iter()
                .map(|(idx, _)| row.get(*idx).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    RowSet::new(visible.into_iter().map(|(_, name)| name).collect(), projected)
}

/// Render a sampled value for a CSV line.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}
