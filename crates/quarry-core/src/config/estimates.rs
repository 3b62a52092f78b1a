//! Thresholds applied to EXPLAIN estimates.

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::types::QueryPlanEstimate;

/// Row/size limits above which a query is flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateThresholds {
    pub rows: u64,
    pub size_gb: f64,
}

impl EstimateThresholds {
    /// Whether either estimate is strictly above its limit. Unset estimates
    /// never exceed anything.
    pub fn exceeded_by(&self, estimate: &QueryPlanEstimate) -> bool {
        estimate.estimated_rows.is_some_and(|rows| rows > self.rows)
            || estimate.estimated_size_gb.is_some_and(|gb| gb > self.size_gb)
    }
}

/// What a caller should do about a query given its plan estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateAssessment {
    /// Warn the user before running the query.
    pub warn: bool,
    /// Skip the exact `COUNT(*)` of the result.
    pub skip_row_count: bool,
}

/// Estimate thresholds per dialect family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatesConfig {
    /// Warning thresholds for federated engines, which are slow on large scans.
    #[serde(default = "default_federated_warning")]
    pub federated_warning: EstimateThresholds,

    /// Warning thresholds for every other engine.
    #[serde(default = "default_warning")]
    pub warning: EstimateThresholds,

    /// Above these, the caller should skip the exact row count.
    #[serde(default = "default_skip_row_count")]
    pub skip_row_count: EstimateThresholds,
}

impl Default for EstimatesConfig {
    fn default() -> Self {
        Self {
            federated_warning: default_federated_warning(),
            warning: default_warning(),
            skip_row_count: default_skip_row_count(),
        }
    }
}

impl EstimatesConfig {
    /// Warning thresholds for `dialect`.
    pub fn warning_for(&self, dialect: Dialect) -> EstimateThresholds {
        match dialect {
            Dialect::Trino => self.federated_warning,
            _ => self.warning,
        }
    }

    pub fn assess(&self, dialect: Dialect, estimate: &QueryPlanEstimate) -> EstimateAssessment {
        EstimateAssessment {
            warn: self.warning_for(dialect).exceeded_by(estimate),
            skip_row_count: self.skip_row_count.exceeded_by(estimate),
        }
    }
}

fn default_federated_warning() -> EstimateThresholds {
    EstimateThresholds {
        rows: 1_000_000_000,
        size_gb: 10.0,
    }
}

fn default_warning() -> EstimateThresholds {
    EstimateThresholds {
        rows: 5_000_000_000,
        size_gb: 5000.0,
    }
}

fn default_skip_row_count() -> EstimateThresholds {
    EstimateThresholds {
        rows: 10_000_000_000,
        size_gb: 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(rows: Option<u64>, size_gb: Option<f64>) -> QueryPlanEstimate {
        QueryPlanEstimate {
            estimated_rows: rows,
            estimated_size_gb: size_gb,
        }
    }

    #[test]
    fn test_federated_engines_warn_earlier() {
        let config = EstimatesConfig::default();
        let big = estimate(Some(2_000_000_000), None);
        assert!(config.assess(Dialect::Trino, &big).warn);
        assert!(!config.assess(Dialect::ClickHouse, &big).warn);
    }

    #[test]
    fn test_size_alone_can_trigger() {
        let config = EstimatesConfig::default();
        let wide = estimate(None, Some(150.0));
        let assessment = config.assess(Dialect::Postgres, &wide);
        assert!(!assessment.warn);
        assert!(assessment.skip_row_count);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let limits = EstimateThresholds { rows: 10, size_gb: 1.0 };
        assert!(!limits.exceeded_by(&estimate(Some(10), Some(1.0))));
        assert!(limits.exceeded_by(&estimate(Some(11), None)));
        assert!(!limits.exceeded_by(&QueryPlanEstimate::default()));
    }
}
