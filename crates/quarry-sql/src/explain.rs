//! EXPLAIN output parsing and the preflight call that produces it.
//!
//! Parsing never fails: plans without a recognisable estimate simply leave
//! the fields of [`QueryPlanEstimate`] unset.

use std::sync::LazyLock;

use quarry_core::{Dialect, EstimateFormat, QueryPlanEstimate, WarehouseClient};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::tail::strip_statement_terminator;

/// Bytes assumed per row when only a row count is reported.
const ASSUMED_ROW_BYTES: f64 = 1024.0;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

static ROWS_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rows?:\s*([\d,]+)").expect("static pattern"));

static PLAN_ESTIMATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Estimates:\s*\{rows:\s*([\d,]+)\s*\(([\d.]+)([KMGT]?B)\)").expect("static pattern")
});

/// A plan row as returned by the client: column name to value.
pub type PlanRow = Map<String, Value>;

/// Literal EXPLAIN prefix for `dialect`.
pub fn explain_command(dialect: Dialect, structured: bool) -> &'static str {
    dialect.explain_command(structured)
}

/// Extract row and size estimates from EXPLAIN output.
pub fn parse_estimate(dialect: Dialect, rows: &[PlanRow]) -> QueryPlanEstimate {
    let estimate = match dialect.estimate_format() {
        EstimateFormat::StructuredRows => parse_structured_rows(rows),
        EstimateFormat::PlanText => parse_plan_text(rows),
        EstimateFormat::Unsupported => QueryPlanEstimate::default(),
    };
    tracing::debug!(
        dialect = %dialect,
        plan_rows = rows.len(),
        estimated_rows = ?estimate.estimated_rows,
        estimated_size_gb = ?estimate.estimated_size_gb,
        "parsed plan estimate"
    );
    estimate
}

// ===== STRUCTURED ROWS =====

/// Maximum `rows` field across plan rows, else the largest `rows: N` in
/// any text column. Size follows from the row count.
fn parse_structured_rows(rows: &[PlanRow]) -> QueryPlanEstimate {
    let structured = rows
        .iter()
        .filter_map(|row| row.get("rows").and_then(as_count))
        .max();

    let estimated_rows = structured.or_else(|| {
        text_values(rows)
            .flat_map(|text| ROWS_IN_TEXT.captures_iter(text))
            .filter_map(|caps| parse_count(&caps[1]))
            .max()
    });

    QueryPlanEstimate {
        estimated_rows,
        estimated_size_gb: estimated_rows.map(|n| n as f64 * ASSUMED_ROW_BYTES / BYTES_PER_GB),
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => parse_count(s),
        _ => None,
    }
}

// ===== PLAN TEXT =====

/// Every `Estimates: {rows: N (S U)` in the plan. Rows and size are kept as
/// independent maxima, so they may come from different plan nodes.
fn parse_plan_text(rows: &[PlanRow]) -> QueryPlanEstimate {
    let mut estimate = QueryPlanEstimate::default();

    for caps in text_values(rows).flat_map(|text| PLAN_ESTIMATES.captures_iter(text)) {
        if let Some(count) = parse_count(&caps[1]) {
            estimate.estimated_rows = Some(estimate.estimated_rows.map_or(count, |m| m.max(count)));
        }
        if let Some(gb) = size_in_gb(&caps[2], &caps[3]) {
            estimate.estimated_size_gb = Some(estimate.estimated_size_gb.map_or(gb, |m| m.max(gb)));
        }
    }

    estimate
}

fn size_in_gb(value: &str, unit: &str) -> Option<f64> {
    let value: f64 = value.parse().ok()?;
    let gb = match unit {
        "B" => value / BYTES_PER_GB,
        "KB" => value / (1024.0 * 1024.0),
        "MB" => value / 1024.0,
        "GB" => value,
        "TB" => value * 1024.0,
        _ => return None,
    };
    Some(gb)
}

// ===== HELPERS =====

fn text_values(rows: &[PlanRow]) -> impl Iterator<Item = &str> {
    rows.iter()
        .flat_map(|row| row.values())
        .filter_map(Value::as_str)
}

fn parse_count(digits: &str) -> Option<u64> {
    digits.replace(',', "").parse().ok()
}

// ===== PREFLIGHT =====

/// Outcome of running EXPLAIN ahead of the real query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreflightResult {
    /// Raw plan rows.
    pub explanation: Vec<PlanRow>,
    /// Parsed estimate; `None` when EXPLAIN itself failed.
    pub estimate: Option<QueryPlanEstimate>,
    pub error: Option<String>,
}

impl PreflightResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Run `<EXPLAIN> <sql>` through `client` and parse the estimate.
///
/// Execution failures are reported in [`PreflightResult::error`], never
/// returned as `Err`.
pub async fn preflight(
    client: &dyn WarehouseClient,
    dialect: Dialect,
    sql: &str,
    structured: bool,
) -> PreflightResult {
    let statement = format!(
        "{} {}",
        explain_command(dialect, structured),
        strip_statement_terminator(sql)
    );

    match client.query(&statement).await {
        Ok(rows) => {
            let explanation = rows.records();
            let estimate = parse_estimate(dialect, &explanation);
            PreflightResult {
                explanation,
                estimate: Some(estimate),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(dialect = %dialect, error = %e, "EXPLAIN failed");
            PreflightResult {
                explanation: Vec::new(),
                estimate: None,
                error: Some(format!("SQL error: {e}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> PlanRow {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_structured_rows_take_max() {
        let rows = vec![
            row(json!({"database": "db", "table": "a", "rows": 1024})),
            row(json!({"database": "db", "table": "b", "rows": "2048"})),
        ];
        let estimate = parse_estimate(Dialect::ClickHouse, &rows);
        assert_eq!(estimate.estimated_rows, Some(2048));
        let gb = estimate.estimated_size_gb.unwrap();
        assert!((gb - 2048.0 * 1024.0 / BYTES_PER_GB).abs() < 1e-12);
    }

    #[test]
    fn test_structured_falls_back_to_text() {
        let rows = vec![
            row(json!({"explain": "ReadFromMergeTree rows: 1,500"})),
            row(json!({"explain": "Filter ROWS: 20"})),
        ];
        let estimate = parse_estimate(Dialect::ClickHouse, &rows);
        assert_eq!(estimate.estimated_rows, Some(1500));
    }

    #[test]
    fn test_plan_text_independent_maxima() {
        let rows = vec![
            row(json!({"Query Plan": "ScanFilter\n    Estimates: {rows: 100 (1.00MB), cpu: 1}"})),
            row(json!({"Query Plan": "Output\n    Estimates: {rows: 5000 (2.00GB), cpu: 9}"})),
            row(json!({"Query Plan": "Aggregate\n    Estimates: {rows: 10 (3.00GB), cpu: 9}"})),
        ];
        let estimate = parse_estimate(Dialect::Trino, &rows);
        assert_eq!(estimate.estimated_rows, Some(5000));
        assert!((estimate.estimated_size_gb.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_size_units() {
        assert_eq!(size_in_gb("1", "TB"), Some(1024.0));
        assert_eq!(size_in_gb("512", "MB"), Some(0.5));
        assert_eq!(size_in_gb("1048576", "KB"), Some(1.0));
        assert_eq!(size_in_gb("1073741824", "B"), Some(1.0));
        assert_eq!(size_in_gb("x", "GB"), None);
    }

    #[test]
    fn test_misses_are_silent() {
        let rows = vec![row(json!({"Query Plan": "Estimates: {rows: ? (?), cpu: ?}"}))];
        assert!(parse_estimate(Dialect::Trino, &rows).is_empty());
        assert!(parse_estimate(Dialect::Postgres, &rows).is_empty());
        assert!(parse_estimate(Dialect::ClickHouse, &[]).is_empty());
    }

    #[test]
    fn test_explain_commands() {
        assert_eq!(explain_command(Dialect::ClickHouse, true), "EXPLAIN ESTIMATE");
        assert_eq!(explain_command(Dialect::ClickHouse, false), "EXPLAIN");
        assert_eq!(explain_command(Dialect::Sqlite, true), "EXPLAIN QUERY PLAN");
        assert_eq!(explain_command(Dialect::Unknown, true), "EXPLAIN");
    }
}
