//! SQL parsing and result-column analysis.

use std::sync::LazyLock;

use quarry_core::Dialect;
use regex::Regex;
use sqlparser::ast::{Expr, Query, Select, SelectItem, SetExpr, Statement};
use sqlparser::dialect::{
    ClickHouseDialect, DuckDbDialect, GenericDialect, MsSqlDialect, MySqlDialect,
    PostgreSqlDialect, SQLiteDialect,
};
use sqlparser::parser::Parser;

use crate::error::SqlError;

static NON_IDENTIFIER_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]").expect("static pattern"));

/// Result columns of the outermost SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultColumns {
    /// Output names in projection order.
    Named(Vec<String>),
    /// The projection contains `*` or `t.*`; names cannot be determined.
    Wildcard,
}

/// Parses SQL with the AST parser configured for a dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlAnalyzer {
    dialect: Dialect,
}

impl Default for SqlAnalyzer {
    fn default() -> Self {
        Self::new(Dialect::Unknown)
    }
}

impl SqlAnalyzer {
    /// Create a new SQL analyzer for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse a SQL string into statements.
    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, SqlError> {
        let dialect = parser_dialect(self.dialect);
        Parser::parse_sql(dialect.as_ref(), sql).map_err(|e| SqlError::parse(e, sql))
    }

    /// Parse and return the first statement.
    pub fn parse_one(&self, sql: &str) -> Result<Statement, SqlError> {
        self.parse(sql)?
            .into_iter()
            .next()
            .ok_or_else(|| SqlError::parse("no statement found", sql))
    }

    /// Names of the columns the statement's outermost SELECT produces.
    pub fn result_columns(&self, sql: &str) -> Result<ResultColumns, SqlError> {
        let stmt = self.parse_one(sql)?;
        let select = outermost_select(&stmt).ok_or_else(|| SqlError::no_select(sql))?;

        let mut names = Vec::with_capacity(select.projection.len());
        for item in &select.projection {
            match item {
                SelectItem::ExprWithAlias { alias, .. } => names.push(alias.value.clone()),
                SelectItem::UnnamedExpr(Expr::Identifier(ident)) => names.push(ident.value.clone()),
                SelectItem::UnnamedExpr(Expr::CompoundIdentifier(idents)) => {
                    match idents.last() {
                        Some(ident) => names.push(ident.value.clone()),
                        None => names.push(synthesize_name(&item.to_string())),
                    }
                }
                SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                    tracing::debug!(dialect = %self.dialect, "wildcard projection, result columns unknown");
                    return Ok(ResultColumns::Wildcard);
                }
                SelectItem::UnnamedExpr(expr) => names.push(synthesize_name(&expr.to_string())),
                other => names.push(synthesize_name(&other.to_string())),
            }
        }

        Ok(ResultColumns::Named(names))
    }
}

/// The sqlparser dialect used for each engine.
fn parser_dialect(dialect: Dialect) -> Box<dyn sqlparser::dialect::Dialect> {
    match dialect {
        Dialect::ClickHouse => Box::new(ClickHouseDialect {}),
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
        Dialect::MsSql => Box::new(MsSqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
        Dialect::Trino | Dialect::Oracle | Dialect::Unknown => Box::new(GenericDialect {}),
    }
}

/// Outermost SELECT of a query statement: the main body first (left-most
/// branch of set operations), else the first CTE that has one.
pub fn outermost_select(stmt: &Statement) -> Option<&Select> {
    match stmt {
        Statement::Query(query) => select_of_query(query),
        _ => None,
    }
}

fn select_of_query(query: &Query) -> Option<&Select> {
    select_of_set_expr(&query.body).or_else(|| {
        query
            .with
            .as_ref()
            .and_then(|with| with.cte_tables.iter().find_map(|cte| select_of_query(&cte.query)))
    })
}

fn select_of_set_expr(body: &SetExpr) -> Option<&Select> {
    match body {
        SetExpr::Select(select) => Some(select.as_ref()),
        SetExpr::Query(query) => select_of_query(query),
        SetExpr::SetOperation { left, .. } => select_of_set_expr(left),
        _ => None,
    }
}

/// Name for an unaliased expression: its SQL text with every
/// non-identifier character replaced by `_`.
fn synthesize_name(sql_text: &str) -> String {
    NON_IDENTIFIER_CHAR.replace_all(sql_text, "_").into_owned()
}
