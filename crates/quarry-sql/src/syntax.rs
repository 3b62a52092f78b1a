//! Fast syntax pre-check.
//!
//! Only a cheap filter ahead of EXPLAIN: the engine stays the authority on
//! what it accepts, so parser complaints about engine-specific syntax are
//! downgraded to warnings unless the check is strict.

use quarry_core::Dialect;
use serde::Serialize;

use crate::error::SqlError;
use crate::parser::SqlAnalyzer;

/// Analytical-engine features the AST parser is known to trip over.
const ENGINE_SPECIFIC_FEATURES: &[&str] = &[
    "SAMPLE",
    "ARRAY JOIN",
    "GLOBAL",
    "cityHash",
    "JSONExtract",
    "ENGINE",
];

/// Constructs for which the pre-check is not worth running at all.
const SKIP_PATTERNS: &[&str] = &[
    "SAMPLE ",
    "ARRAY JOIN",
    "ENGINE =",
    "cityHash",
    "JSONExtract",
    "FINAL",
    "PREWHERE",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyntaxCheck {
    pub valid: bool,
    pub error: Option<String>,
    pub warning: Option<String>,
}

impl SyntaxCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    fn invalid(error: String) -> Self {
        Self {
            valid: false,
            error: Some(error),
            warning: None,
        }
    }
}

/// Parse `sql` for `dialect` and report whether it looks well-formed.
pub fn check_syntax(sql: &str, dialect: Dialect, strict: bool) -> SyntaxCheck {
    let statements = match SqlAnalyzer::new(dialect).parse(sql) {
        Ok(statements) => statements,
        Err(SqlError::ParseError { message, .. }) => {
            let error = format!("SQL parsing error: {message}");
            if !strict && mentions_engine_feature(&message) {
                tracing::debug!(dialect = %dialect, %message, "parse error downgraded to warning");
                return SyntaxCheck {
                    valid: true,
                    error: None,
                    warning: Some(format!("{error} (may be ClickHouse-specific syntax)")),
                };
            }
            return SyntaxCheck::invalid(error);
        }
        Err(e) => return SyntaxCheck::invalid(format!("SQL parsing error: {e}")),
    };

    if statements.is_empty() {
        return SyntaxCheck::invalid("Failed to parse SQL - invalid syntax".to_string());
    }
    SyntaxCheck::ok()
}

/// Whether `sql` uses constructs that make the pre-check unreliable.
pub fn should_skip_syntax_check(sql: &str) -> bool {
    let upper = sql.to_uppercase();
    SKIP_PATTERNS
        .iter()
        .any(|pattern| upper.contains(&pattern.to_uppercase()))
}

fn mentions_engine_feature(message: &str) -> bool {
    let lower = message.to_lowercase();
    ENGINE_SPECIFIC_FEATURES
        .iter()
        .any(|feature| lower.contains(&feature.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sql() {
        let check = check_syntax(
            "SELECT wallet, SUM(amount) FROM trades GROUP BY wallet",
            Dialect::ClickHouse,
            false,
        );
        assert_eq!(check, SyntaxCheck::ok());
    }

    #[test]
    fn test_invalid_sql() {
        let check = check_syntax("SELEC wallet FROM trades", Dialect::Postgres, false);
        assert!(!check.valid);
        assert!(check.error.unwrap().starts_with("SQL parsing error:"));
    }

    #[test]
    fn test_empty_input() {
        let check = check_syntax("   ", Dialect::Postgres, false);
        assert!(!check.valid);
    }

    #[test]
    fn test_engine_feature_detection() {
        assert!(mentions_engine_feature("Expected: end of statement, found: GLOBAL"));
        assert!(mentions_engine_feature("unknown function cityhash64"));
        assert!(!mentions_engine_feature("Expected: an expression, found: EOF"));
    }

    #[test]
    fn test_should_skip() {
        assert!(should_skip_syntax_check("SELECT * FROM t final"));
        assert!(should_skip_syntax_check("select * from t sample 0.1"));
        assert!(should_skip_syntax_check("SELECT a FROM t PREWHERE a > 1"));
        assert!(!should_skip_syntax_check("SELECT sampled FROM t"));
    }
}
