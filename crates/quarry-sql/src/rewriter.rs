//! Paginated, sorted and count-augmented wrapping of caller SQL.
//!
//! The caller's statement is never edited in place: it is wrapped either in
//! a derived table (`FROM (<sql>) AS t`) or in a CTE (`WITH orig_sql AS
//! (<sql>)`) depending on the dialect's [`CountStrategy`]. The result carries
//! exactly one `:limit` and one `:offset` bind placeholder.

use quarry_core::{CountStrategy, Dialect, SortOrder};

use crate::tail::strip_statement_terminator;

/// Bind placeholder for the page size.
pub const LIMIT_PLACEHOLDER: &str = ":limit";

/// Bind placeholder for the row offset.
pub const OFFSET_PLACEHOLDER: &str = ":offset";

/// Everything needed to rewrite one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    pub sql: String,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub include_total_count: bool,
    pub dialect: Dialect,
}

impl RewriteRequest {
    pub fn new(sql: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            sql: sql.into(),
            sort_by: None,
            sort_order: SortOrder::default(),
            include_total_count: false,
            dialect,
        }
    }

    pub fn sort_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(column.into());
        self.sort_order = order;
        self
    }

    pub fn with_total_count(mut self, include: bool) -> Self {
        self.include_total_count = include;
        self
    }

    pub fn rewrite(&self) -> String {
        rewrite(
            &self.sql,
            self.sort_by.as_deref(),
            self.sort_order,
            self.include_total_count,
            self.dialect,
        )
    }
}

/// Wrap `sql` with an outer ORDER BY, pagination placeholders and, when
/// requested, a `total_count` column.
///
/// `sort_by` is emitted as given apart from dialect quoting; validate it
/// against the declared columns first.
pub fn rewrite(
    sql: &str,
    sort_by: Option<&str>,
    sort_order: SortOrder,
    include_total_count: bool,
    dialect: Dialect,
) -> String {
    let inner = strip_statement_terminator(sql);
    let order_clause = order_clause(sort_by, sort_order, dialect);
    let strategy = dialect.count_strategy();
    let pagination = strategy.pagination_clause();

    tracing::debug!(
        dialect = %dialect,
        sort_by = ?sort_by,
        include_total_count,
        strategy = ?strategy,
        "rewriting SQL for pagination"
    );

    let mut out = match (strategy, include_total_count) {
        (CountStrategy::ScalarSubquery, true) => format!(
            "SELECT t.*, (SELECT COUNT(*) FROM (\n{inner}\n) AS count_subquery) AS total_count\nFROM (\n{inner}\n) AS t"
        ),
        (CountStrategy::ScalarSubquery, false) => format!("SELECT t.*\nFROM (\n{inner}\n) AS t"),
        (CountStrategy::WindowedCte, true) => format!(
            "WITH orig_sql AS (\n{inner}\n)\nSELECT t.*, COUNT(*) OVER () AS total_count\nFROM orig_sql AS t"
        ),
        (CountStrategy::WindowedCte, false) => {
            format!("WITH orig_sql AS (\n{inner}\n)\nSELECT t.*\nFROM orig_sql AS t")
        }
    };

    if let Some(order_clause) = order_clause {
        out.push('\n');
        out.push_str(&order_clause);
    }
    out.push('\n');
    out.push_str(pagination);
    out
}

/// Outer ORDER BY for the dialect, if any.
fn order_clause(sort_by: Option<&str>, sort_order: SortOrder, dialect: Dialect) -> Option<String> {
    match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
        Some(column) => Some(format!(
            "ORDER BY {} {}",
            dialect.quote_sort_identifier(column),
            sort_order.keyword()
        )),
        None if dialect.requires_deterministic_order() => {
            Some(format!("ORDER BY 1 {}", sort_order.keyword()))
        }
        None => None,
    }
}
