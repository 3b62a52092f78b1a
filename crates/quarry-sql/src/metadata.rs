//! Consistency checks between declared result columns and the SQL that is
//! supposed to produce them.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use quarry_core::{DeclaredColumn, Dialect, ValidationResult};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SqlError;
use crate::parser::{ResultColumns, SqlAnalyzer};

static SIMPLE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"));

/// Warning attached when result columns cannot be determined.
pub const SKIPPED_WARNING: &str =
    "SQL uses SELECT * or couldn't determine columns - skipping validation";

/// Result column names produced by `sql`.
///
/// An empty list means the projection contains a wildcard and the columns
/// cannot be known without executing the query.
pub fn extract_result_columns(sql: &str, dialect: Dialect) -> Result<Vec<String>, SqlError> {
    match SqlAnalyzer::new(dialect).result_columns(sql)? {
        ResultColumns::Named(names) => Ok(names),
        ResultColumns::Wildcard => Ok(Vec::new()),
    }
}

/// Compare `declared` against the columns `sql` actually returns.
pub fn validate_metadata(sql: &str, declared: &[DeclaredColumn], dialect: Dialect) -> ValidationResult {
    if sql.trim().is_empty() {
        return ValidationResult::failed("No SQL found in metadata");
    }

    let sql_columns = match extract_result_columns(sql, dialect) {
        Ok(columns) => columns,
        Err(e) => {
            tracing::debug!(dialect = %dialect, error = %e, "metadata validation could not parse SQL");
            return ValidationResult::failed(e.to_string());
        }
    };

    if sql_columns.is_empty() {
        return ValidationResult {
            valid: true,
            warnings: vec![SKIPPED_WARNING.to_string()],
            ..ValidationResult::default()
        };
    }

    let metadata_columns: Vec<String> = declared
        .iter()
        .filter_map(DeclaredColumn::name)
        .map(str::to_string)
        .collect();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let in_sql = normalized(&sql_columns);
    let in_metadata = normalized(&metadata_columns);

    let missing: Vec<&str> = in_sql.difference(&in_metadata).map(String::as_str).collect();
    if !missing.is_empty() {
        errors.push(format!(
            "Columns in SQL but missing from metadata: {}",
            missing.join(", ")
        ));
    }
    let extra: Vec<&str> = in_metadata.difference(&in_sql).map(String::as_str).collect();
    if !extra.is_empty() {
        errors.push(format!(
            "Columns in metadata but not in SQL results: {}",
            extra.join(", ")
        ));
    }

    for column in declared {
        let Some(name) = column.name() else {
            warnings.push(format!(
                "Column {} has no column_name",
                column.id.as_deref().unwrap_or("<unknown>")
            ));
            continue;
        };
        errors.extend(column_name_problems(name));
    }

    tracing::debug!(
        dialect = %dialect,
        sql_columns = sql_columns.len(),
        metadata_columns = metadata_columns.len(),
        errors = errors.len(),
        "validated query metadata"
    );

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
        sql_columns,
        metadata_columns,
    }
}

/// [`validate_metadata`], turning an invalid result into
/// [`SqlError::MetadataValidation`].
pub fn validate_and_raise(
    sql: &str,
    declared: &[DeclaredColumn],
    dialect: Dialect,
) -> Result<ValidationResult, SqlError> {
    let result = validate_metadata(sql, declared, dialect);
    if result.valid {
        return Ok(result);
    }
    Err(SqlError::MetadataValidation {
        errors: result.errors,
        warnings: result.warnings,
        sql_columns: result.sql_columns,
        metadata_columns: result.metadata_columns,
    })
}

/// Query metadata as callers hand it over in JSON.
#[derive(Debug, Deserialize)]
struct QueryMetadataPayload {
    #[serde(default)]
    sql: Option<String>,
    #[serde(default)]
    columns: Option<Vec<Value>>,
    #[serde(default)]
    db_dialect: Option<String>,
}

/// Validate a loose `{sql, columns, db_dialect}` object.
///
/// An explicit `db_dialect` in the payload takes precedence over `dialect`.
pub fn validate_metadata_value(value: &Value, dialect: Dialect) -> ValidationResult {
    let payload: QueryMetadataPayload = match serde_json::from_value(value.clone()) {
        Ok(payload) => payload,
        Err(e) => return ValidationResult::failed(format!("Failed to parse metadata: {e}")),
    };

    let dialect = Dialect::from_query_metadata(payload.db_dialect.as_deref(), dialect);
    let declared = payload
        .columns
        .as_deref()
        .map(DeclaredColumn::from_values)
        .unwrap_or_default();

    validate_metadata(payload.sql.as_deref().unwrap_or_default(), &declared, dialect)
}

fn normalized(names: &[String]) -> BTreeSet<String> {
    names.iter().map(|n| n.trim().to_lowercase()).collect()
}

/// Common mistakes in a declared column name.
fn column_name_problems(name: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if name.contains('(') && name.contains(')') {
        problems.push(format!(
            "column_name '{name}' contains function/expression - should be the alias instead"
        ));
    }
    if name.contains('.') {
        problems.push(format!(
            "column_name '{name}' contains table prefix - should be just the column name"
        ));
    }
    if !SIMPLE_IDENTIFIER.is_match(name) {
        problems.push(format!("column_name '{name}' is not a valid SQL identifier"));
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declared(names: &[&str]) -> Vec<DeclaredColumn> {
        names.iter().map(|n| DeclaredColumn::named(*n)).collect()
    }

    #[test]
    fn test_matching_columns_are_valid() {
        let result = validate_metadata(
            "SELECT wallet, SUM(amount) AS total FROM trades GROUP BY wallet",
            &declared(&["Wallet", "total"]),
            Dialect::ClickHouse,
        );
        assert!(result.valid, "{:?}", result.errors);
        assert_eq!(result.sql_columns, vec!["wallet", "total"]);
        assert_eq!(result.metadata_columns, vec!["Wallet", "total"]);
    }

    #[test]
    fn test_missing_and_extra_columns() {
        let result = validate_metadata(
            "SELECT a, b, c FROM t",
            &declared(&["a", "z"]),
            Dialect::Postgres,
        );
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "Columns in SQL but missing from metadata: b, c",
                "Columns in metadata but not in SQL results: z",
            ]
        );
    }

    #[test]
    fn test_star_skips_validation() {
        let result = validate_metadata("SELECT * FROM t", &declared(&["x"]), Dialect::Postgres);
        assert!(result.valid);
        assert_eq!(result.warnings, vec![SKIPPED_WARNING]);
        assert!(result.sql_columns.is_empty());
    }

    #[test]
    fn test_unnamed_column_warns() {
        let mut columns = declared(&["a"]);
        columns.push(DeclaredColumn {
            id: Some("c2".into()),
            ..DeclaredColumn::default()
        });
        let result = validate_metadata("SELECT a FROM t", &columns, Dialect::Postgres);
        assert!(result.valid);
        assert_eq!(result.warnings, vec!["Column c2 has no column_name"]);
    }

    #[test]
    fn test_empty_sql() {
        let result = validate_metadata("  ", &declared(&["a"]), Dialect::Postgres);
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["No SQL found in metadata"]);
    }

    #[test]
    fn test_parse_failure_is_data() {
        let result = validate_metadata("SELEC FROM", &declared(&["a"]), Dialect::Postgres);
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("Failed to parse SQL:"));
    }

    #[test]
    fn test_validate_and_raise() {
        let err = validate_and_raise("SELECT a FROM t", &declared(&["b"]), Dialect::Postgres)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("QueryMetadata validation failed:"));
        assert!(msg.contains("SQL columns: [a]"));

        assert!(validate_and_raise("SELECT a FROM t", &declared(&["a"]), Dialect::Postgres).is_ok());
    }

    #[test]
    fn test_value_payload() {
        let payload = json!({
            "sql": "SELECT a AS x FROM t",
            "columns": [{"id": 1, "column_name": "x"}],
            "db_dialect": "clickhouse"
        });
        assert!(validate_metadata_value(&payload, Dialect::Unknown).valid);

        let result = validate_metadata_value(&json!({"sql": 42}), Dialect::Unknown);
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("Failed to parse metadata:"));
    }
}
