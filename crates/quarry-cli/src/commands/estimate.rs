//! `quarry estimate` and `quarry preflight`.

use std::path::Path;

use quarry_core::{Dialect, EstimateAssessment, QueryPlanEstimate};
use quarry_sql::{PlanRow, parse_estimate, preflight};
use serde::Serialize;
use serde_json::Value;

use super::input::{SqlInput, read_json};
use super::{Settings, connect, print_json};

#[derive(Debug, Serialize)]
struct EstimateReport {
    dialect: Dialect,
    estimate: Option<QueryPlanEstimate>,
    assessment: Option<EstimateAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl EstimateReport {
    fn new(settings: &Settings, estimate: QueryPlanEstimate) -> Self {
        Self {
            dialect: settings.dialect,
            assessment: Some(settings.config.estimates.assess(settings.dialect, &estimate)),
            estimate: Some(estimate),
            error: None,
        }
    }
}

pub fn run_estimate(settings: &Settings, plan: &Path) -> anyhow::Result<()> {
    let rows = plan_rows(read_json(plan)?)?;
    let report = EstimateReport::new(settings, parse_estimate(settings.dialect, &rows));
    warn_if_flagged(&report);
    print_json(&report)
}

pub async fn run_preflight(
    settings: &Settings,
    input: &SqlInput,
    structured: bool,
) -> anyhow::Result<()> {
    let sql = input.read()?;
    let client = connect(settings).await?;

    let result = preflight(&client, settings.dialect, &sql, structured).await;
    let report = match (result.estimate, result.error) {
        (Some(estimate), _) => EstimateReport::new(settings, estimate),
        (None, error) => EstimateReport {
            dialect: settings.dialect,
            estimate: None,
            assessment: None,
            error,
        },
    };
    warn_if_flagged(&report);
    print_json(&report)
}

/// Accept either a bare array of row objects or `{"rows": [...]}`.
fn plan_rows(value: Value) -> anyhow::Result<Vec<PlanRow>> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("rows") {
            Some(Value::Array(rows)) => rows,
            _ => anyhow::bail!("plan object has no 'rows' array"),
        },
        _ => anyhow::bail!("plan must be a JSON array of row objects"),
    };

    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| match row {
            Value::Object(map) => Ok(map),
            other => anyhow::bail!("plan row {idx} is not an object: {other}"),
        })
        .collect()
}

fn warn_if_flagged(report: &EstimateReport) {
    let Some(assessment) = report.assessment else {
        return;
    };
    let estimate = report.estimate.unwrap_or_default();
    if assessment.warn {
        tracing::warn!(
            dialect = %report.dialect,
            rows = ?estimate.estimated_rows,
            size_gb = ?estimate.estimated_size_gb,
            "query is expected to scan a large amount of data"
        );
    }
    if assessment.skip_row_count {
        tracing::info!("estimate above row-count threshold, total count should be skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::QuarryConfig;
    use serde_json::json;

    #[test]
    fn test_plan_rows_shapes() {
        let rows = plan_rows(json!([{"rows": 10}, {"explain": "x"}])).unwrap();
        assert_eq!(rows.len(), 2);

        let rows = plan_rows(json!({"rows": [{"rows": 10}]})).unwrap();
        assert_eq!(rows.len(), 1);

        assert!(plan_rows(json!([1, 2])).is_err());
        assert!(plan_rows(json!("EXPLAIN")).is_err());
    }

    #[test]
    fn test_report_assesses_estimate() {
        let settings = Settings {
            config: QuarryConfig::default(),
            dialect: Dialect::Trino,
        };
        let estimate = QueryPlanEstimate {
            estimated_rows: Some(2_000_000_000),
            estimated_size_gb: Some(1.0),
        };

        let report = EstimateReport::new(&settings, estimate);
        let assessment = report.assessment.unwrap();
        assert!(assessment.warn);
        assert!(!assessment.skip_row_count);
    }
}
