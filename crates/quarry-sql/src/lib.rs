//! # quarry-sql
//!
//! Dialect-aware SQL handling for Quarry.
//!
//! This crate provides functionality to:
//! - Wrap caller SQL with sorting, pagination placeholders and a total count
//! - Validate a requested sort column against declared result columns
//! - Check declared result columns against what the SQL actually returns,
//!   using `sqlparser`
//! - Parse EXPLAIN output into row and size estimates
//!
//! ## Pagination Rewrite
//!
//! **Before (from caller):**
//! ```sql
//! SELECT * FROM trades;
//! ```
//!
//! **After (Trino, sorted by `amount`, with total count):**
//! ```sql
//! SELECT t.*, (SELECT COUNT(*) FROM (
//! SELECT * FROM trades
//! ) AS count_subquery) AS total_count
//! FROM (
//! SELECT * FROM trades
//! ) AS t
//! ORDER BY "amount" DESC
//! OFFSET :offset LIMIT :limit
//! ```
//!
//! ## Dialect Families
//!
//! | Family | Dialects | Count column | Pagination |
//! |--------|----------|--------------|------------|
//! | Scalar subquery | Trino | `(SELECT COUNT(*) ...)` | `OFFSET :offset LIMIT :limit` |
//! | Windowed CTE | everything else | `COUNT(*) OVER ()` | `LIMIT :limit OFFSET :offset` |

pub mod error;
pub mod explain;
pub mod metadata;
pub mod parser;
pub mod rewriter;
pub mod sort;
pub mod syntax;
pub mod tail;

pub use error::SqlError;
pub use explain::{PlanRow, PreflightResult, explain_command, parse_estimate, preflight};
pub use metadata::{
    extract_result_columns, validate_and_raise, validate_metadata, validate_metadata_value,
};
pub use parser::{ResultColumns, SqlAnalyzer};
pub use rewriter::{LIMIT_PLACEHOLDER, OFFSET_PLACEHOLDER, RewriteRequest, rewrite};
pub use sort::{SortColumnError, validate_sort_column, validate_sort_column_values};
pub use syntax::{SyntaxCheck, check_syntax, should_skip_syntax_check};
pub use tail::{
    sanitize_sort_by, starts_with_cte, strip_final_order_by_and_trailing, strip_leading_comments,
    strip_statement_terminator,
};
