//! Integration tests for pagination rewriting and column validation.
//!
//! Run with: cargo test --package quarry-sql --test rewrite_and_validate

use pretty_assertions::assert_eq;
use quarry_core::{ColumnDescriptor, DeclaredColumn, Dialect, SortOrder};
use quarry_sql::{
    LIMIT_PLACEHOLDER, OFFSET_PLACEHOLDER, RewriteRequest, extract_result_columns,
    parse_estimate, rewrite, strip_final_order_by_and_trailing, validate_metadata,
    validate_sort_column,
};
use serde_json::json;

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in:\n{haystack}"))
}

/// Every dialect, sort and count combination binds exactly one limit and one offset.
#[test]
fn test_placeholders_appear_exactly_once() {
    for dialect in Dialect::all() {
        for sort_by in [None, Some("col")] {
            for include_total_count in [true, false] {
                let sql = rewrite(
                    "SELECT col FROM t;",
                    sort_by,
                    SortOrder::Asc,
                    include_total_count,
                    *dialect,
                );
                assert_eq!(
                    sql.matches(LIMIT_PLACEHOLDER).count(),
                    1,
                    "{dialect} sort={sort_by:?} count={include_total_count}:\n{sql}"
                );
                assert_eq!(
                    sql.matches(OFFSET_PLACEHOLDER).count(),
                    1,
                    "{dialect} sort={sort_by:?} count={include_total_count}:\n{sql}"
                );
            }
        }
    }
}

#[test]
fn test_trino_counted_scenario() {
    let sql = RewriteRequest::new("SELECT * FROM trades", Dialect::Trino)
        .sort_by("amount", SortOrder::parse("desc"))
        .with_total_count(true)
        .rewrite();

    assert!(sql.contains("(SELECT COUNT(*) FROM"));
    assert!(sql.contains("AS count_subquery"));
    assert!(sql.contains("\"amount\""));
    assert!(position(&sql, "OFFSET") < position(&sql, "LIMIT"));
}

#[test]
fn test_clickhouse_counted_scenario() {
    let sql = RewriteRequest::new("SELECT * FROM trades", Dialect::ClickHouse)
        .sort_by("amount", SortOrder::Desc)
        .with_total_count(true)
        .rewrite();

    assert!(sql.contains("WITH orig_sql AS"));
    assert!(sql.contains("COUNT(*) OVER ()"));
    assert!(!sql.contains("\"amount\""));
    assert!(position(&sql, "LIMIT") < position(&sql, "OFFSET"));
}

#[test]
fn test_only_federated_dialect_gets_default_order() {
    for dialect in Dialect::all() {
        let sql = rewrite("SELECT a FROM t", None, SortOrder::Asc, false, *dialect);
        assert_eq!(
            sql.contains("ORDER BY 1"),
            *dialect == Dialect::Trino,
            "{dialect}:\n{sql}"
        );
    }
}

#[test]
fn test_stripped_tail_then_rewrite() {
    let caller = "SELECT wallet FROM trades ORDER BY wallet LIMIT 100;";
    let sql = rewrite(
        &strip_final_order_by_and_trailing(caller),
        Some("wallet"),
        SortOrder::Asc,
        false,
        Dialect::Postgres,
    );
    assert_eq!(
        sql,
        "WITH orig_sql AS (\nSELECT wallet FROM trades\n)\nSELECT t.*\nFROM orig_sql AS t\nORDER BY wallet ASC\nLIMIT :limit OFFSET :offset"
    );
}

/// Feeding a canonical name back in returns it unchanged.
#[test]
fn test_sort_validation_is_idempotent() {
    let columns: Vec<DeclaredColumn> = vec![
        ColumnDescriptor::new("BlockTime", "DateTime").into(),
        DeclaredColumn::from(&json!({"column_name": "Amount"})),
    ];
    for requested in ["blocktime", "BLOCKTIME", "amount"] {
        let canonical = validate_sort_column(requested, Some(columns.as_slice())).unwrap();
        assert!(columns.iter().any(|c| c.name() == Some(canonical.as_str())));
        assert_eq!(
            validate_sort_column(&canonical, Some(columns.as_slice())).unwrap(),
            canonical
        );
    }
}

#[test]
fn test_extract_aliases_in_every_dialect() {
    for dialect in Dialect::all() {
        assert_eq!(
            extract_result_columns("SELECT a AS x, b AS y FROM t", *dialect).unwrap(),
            vec!["x", "y"],
            "{dialect}"
        );
    }
}

#[test]
fn test_qualifier_and_expression_names_rejected_distinctly() {
    let sql = "SELECT t.amount AS amount FROM trades t";

    let qualified = validate_metadata(sql, &[DeclaredColumn::named("t.amount")], Dialect::Postgres);
    let expression = validate_metadata(sql, &[DeclaredColumn::named("SUM(amount)")], Dialect::Postgres);
    let plain = validate_metadata(sql, &[DeclaredColumn::named("amount")], Dialect::Postgres);

    assert!(!qualified.valid);
    assert!(!expression.valid);
    assert!(plain.valid, "{:?}", plain.errors);

    assert!(qualified.errors.iter().any(|e| e.contains("contains table prefix")));
    assert!(!qualified.errors.iter().any(|e| e.contains("function/expression")));
    assert!(expression.errors.iter().any(|e| e.contains("function/expression")));
    assert!(!expression.errors.iter().any(|e| e.contains("table prefix")));
}

#[test]
fn test_trino_estimates_independent_maxima() {
    let plan = json!({
        "Query Plan": "Fragment 0\n    Output\n        Estimates: {rows: 100 (1.00MB), cpu: 0, memory: 0B, network: 0B}\n    ScanFilter\n        Estimates: {rows: 5000 (2.00GB), cpu: 2G, memory: 0B, network: 0B}"
    });
    let rows = vec![plan.as_object().cloned().unwrap()];
    let estimate = parse_estimate(Dialect::Trino, &rows);
    assert_eq!(estimate.estimated_rows, Some(5000));
    assert!((estimate.estimated_size_gb.unwrap() - 2.0).abs() < 1e-9);
}
