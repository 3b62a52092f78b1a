//! `quarry rewrite` and `quarry sort-check`.

use std::path::Path;

use quarry_core::SortOrder;
use quarry_sql::{
    RewriteRequest, SortColumnError, sanitize_sort_by, strip_final_order_by_and_trailing,
    validate_sort_column_values,
};
use serde_json::Value;

use super::Settings;
use super::input::{SqlInput, read_json};

pub fn run_rewrite(
    settings: &Settings,
    input: &SqlInput,
    sort_by: Option<&str>,
    sort_order: &str,
    total_count: bool,
    strip_tail: bool,
) -> anyhow::Result<()> {
    let sql = input.read()?;
    let sql = if strip_tail {
        strip_final_order_by_and_trailing(&sql)
    } else {
        sql
    };

    let mut request = RewriteRequest::new(sql, settings.dialect).with_total_count(total_count);
    if let Some(raw) = sort_by {
        let column = sanitize_sort_by(raw)
            .ok_or_else(|| anyhow::anyhow!("'{raw}' is not a plain column name"))?;
        request = request.sort_by(column, SortOrder::parse(sort_order));
    } else {
        request.sort_order = SortOrder::parse(sort_order);
    }

    tracing::debug!(dialect = %settings.dialect, strip_tail, "rewriting query");
    println!("{}", request.rewrite());
    Ok(())
}

pub fn run_sort_check(metadata: &Path, sort_by: &str) -> anyhow::Result<()> {
    let metadata = read_json(metadata)?;
    let column = resolve_sort_column(&metadata, sort_by)?;
    println!("{column}");
    Ok(())
}

/// Validate `sort_by` against the `columns` array of a metadata object.
fn resolve_sort_column(metadata: &Value, sort_by: &str) -> Result<String, SortColumnError> {
    let columns = metadata
        .get("columns")
        .and_then(Value::as_array)
        .map(Vec::as_slice);
    validate_sort_column_values(sort_by, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_sort_column() {
        let metadata = json!({
            "sql": "SELECT wallet, amount FROM trades",
            "columns": [{"column_name": "wallet"}, {"name": "Amount"}]
        });

        assert_eq!(resolve_sort_column(&metadata, "amount").unwrap(), "Amount");

        let err = resolve_sort_column(&metadata, "price").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid sort column 'price'. Available columns: Amount, wallet"
        );
    }

    #[test]
    fn test_missing_columns_key() {
        let err = resolve_sort_column(&json!({"sql": "SELECT 1"}), "a").unwrap_err();
        assert_eq!(err, SortColumnError::MetadataUnavailable);
    }
}
