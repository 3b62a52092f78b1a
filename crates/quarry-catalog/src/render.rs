//! Human-readable schema description.

use std::fmt::Write;

use crate::sample::value_to_string;
use crate::walker::{SchemaSnapshot, SnapshotTable};

pub const HEADER: &str = "The database contains the following tables:\n\n";

/// Render every table of `snapshot`, numbered from 1. Hidden columns are
/// never printed.
pub fn render_schema_text(snapshot: &SchemaSnapshot) -> String {
    let mut out = String::from(HEADER);
    for (idx, table) in snapshot.tables.iter().enumerate() {
        render_table(&mut out, idx + 1, table);
    }
    out
}

fn render_table(out: &mut String, number: usize, entry: &SnapshotTable) {
    let description = entry
        .table
        .description
        .clone()
        .unwrap_or_else(|| format!("Stores {} data.", entry.path.table.replace('_', " ")));
    let _ = writeln!(out, "Table #{number}. **{}** ({description})", entry.name);

    if entry.columns_error.is_some() {
        out.push_str("   (Unable to retrieve column information)\n\n");
        return;
    }

    for column in entry.table.visible_columns() {
        let _ = write!(out, "   - {} ({})", column.name, column.data_type);
        if let Some(description) = column.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(out, " - {description}");
        }
        if let Some(example) = column.example.as_deref().filter(|e| !e.is_empty()) {
            let _ = write!(out, " (e.g., {example})");
        }
        out.push('\n');
    }
    out.push('\n');

    if let Some(sample) = entry.sample.as_ref().filter(|s| !s.is_empty()) {
        out.push_str("\nSample Data Rows (CSVs):\n");
        let lines: Vec<String> = sample
            .rows
            .iter()
            .map(|row| row.iter().map(value_to_string).collect::<Vec<_>>().join(","))
            .collect();
        out.push_str(&lines.join("\n"));
        out.push_str("\n\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quarry_core::{CatalogPath, ColumnDescriptor, Dialect, RowSet, TableDescriptor};
    use serde_json::json;

    fn entry(path: CatalogPath, table: TableDescriptor) -> SnapshotTable {
        SnapshotTable {
            name: path.display_name(),
            path,
            table,
            columns_error: None,
            sample: None,
        }
    }

    #[test]
    fn test_render() {
        let mut amount = ColumnDescriptor::new("amount", "numeric");
        amount.description = Some("Order total".into());
        amount.example = Some("19.99".into());
        let mut secret = ColumnDescriptor::new("secret", "text");
        secret.hidden = true;

        let mut orders = entry(
            CatalogPath::new(None, Some("public"), "order_items"),
            TableDescriptor {
                columns: vec![ColumnDescriptor::new("id", "integer"), amount, secret],
                ..TableDescriptor::default()
            },
        );
        orders.sample = Some(RowSet::new(
            vec!["id".into(), "amount".into()],
            vec![vec![json!(1), json!(9.5)], vec![json!(2), json!(null)]],
        ));

        let mut broken = entry(
            CatalogPath::new(None, Some("public"), "events"),
            TableDescriptor {
                description: Some("Raw events".into()),
                ..TableDescriptor::default()
            },
        );
        broken.columns_error = Some("permission denied".into());

        let snapshot = SchemaSnapshot {
            dialect: Dialect::Postgres,
            tables: vec![orders, broken],
            pruned: Vec::new(),
        };

        assert_eq!(
            render_schema_text(&snapshot),
            "The database contains the following tables:\n\n\
             Table #1. **public.order_items** (Stores order items data.)\n\
             \x20  - id (integer)\n\
             \x20  - amount (numeric) - Order total (e.g., 19.99)\n\
             \n\
             \nSample Data Rows (CSVs):\n\
             1,9.5\n\
             2,\n\
             \n\
             Table #2. **public.events** (Raw events)\n\
             \x20  (Unable to retrieve column information)\n\n"
        );
    }
}
