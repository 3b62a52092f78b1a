//! SQL dialect model.
//!
//! Every dialect-dependent decision goes through one of the strategy tables
//! on [`Dialect`]: identifier quoting, count strategy, pagination order,
//! EXPLAIN command, sample query, estimate format, catalog level and the
//! system-schema denylist. Each table is an exhaustive `match` with a single
//! arm covering [`Dialect::Unknown`], so an unrecognised engine always falls
//! back to the documented default instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported SQL engine behaviour profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Dialect {
    ClickHouse,
    Postgres,
    MySql,
    Sqlite,
    Trino,
    MsSql,
    Oracle,
    DuckDb,
    #[default]
    Unknown,
}

/// How a sort identifier is emitted into the outer ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierQuoting {
    /// Case-sensitive engines: `"col"`, embedded quotes doubled.
    DoubleQuoted,
    /// Emit the identifier as given.
    Bare,
}

/// How the total row count is attached to a paginated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountStrategy {
    /// `(SELECT COUNT(*) FROM (<sql>) AS count_subquery)`, pagination as
    /// `OFFSET :offset LIMIT :limit`.
    ScalarSubquery,
    /// `WITH orig_sql AS (<sql>)` plus `COUNT(*) OVER ()`, pagination as
    /// `LIMIT :limit OFFSET :offset`.
    WindowedCte,
}

impl CountStrategy {
    /// Pagination tail with both bind placeholders, in the token order the
    /// family requires.
    pub fn pagination_clause(self) -> &'static str {
        match self {
            CountStrategy::ScalarSubquery => "OFFSET :offset LIMIT :limit",
            CountStrategy::WindowedCte => "LIMIT :limit OFFSET :offset",
        }
    }
}

/// Shape of the row/size estimates an engine reports in its plan output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateFormat {
    /// Numeric `rows` per plan row, with free-text `rows: N` as fallback.
    StructuredRows,
    /// `Estimates: {rows: N (S<unit>), ...}` fragments in plan text.
    PlanText,
    /// No known estimate format.
    Unsupported,
}

/// Where the catalog level of the hierarchy comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMode {
    /// Multi-catalog engine listing catalogs natively.
    Federated,
    /// The connected database acts as the single catalog.
    DatabaseAsCatalog,
    /// No catalog level.
    None,
}

const ALL: [Dialect; 9] = [
    Dialect::ClickHouse,
    Dialect::Postgres,
    Dialect::MySql,
    Dialect::Sqlite,
    Dialect::Trino,
    Dialect::MsSql,
    Dialect::Oracle,
    Dialect::DuckDb,
    Dialect::Unknown,
];

impl Dialect {
    /// Every dialect, including `Unknown`.
    pub fn all() -> &'static [Dialect] {
        &ALL
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::ClickHouse => "clickhouse",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Trino => "trino",
            Dialect::MsSql => "mssql",
            Dialect::Oracle => "oracle",
            Dialect::DuckDb => "duckdb",
            Dialect::Unknown => "unknown",
        }
    }

    /// Map an engine name (SQLAlchemy- or sqlglot-style) to a dialect.
    ///
    /// Unrecognised names map to [`Dialect::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "clickhouse" => Dialect::ClickHouse,
            "postgres" | "postgresql" => Dialect::Postgres,
            "mysql" | "mariadb" => Dialect::MySql,
            "sqlite" => Dialect::Sqlite,
            "trino" => Dialect::Trino,
            "mssql" | "tsql" | "sqlserver" => Dialect::MsSql,
            "oracle" => Dialect::Oracle,
            "duckdb" => Dialect::DuckDb,
            _ => Dialect::Unknown,
        }
    }

    /// Detect the dialect from a driver string such as `clickhouse+native`
    /// or `postgresql+psycopg2`.
    pub fn from_driver(driver: &str) -> Self {
        let driver = driver.to_ascii_lowercase();
        if driver.contains("clickhouse") {
            Dialect::ClickHouse
        } else if driver.contains("postgres") {
            Dialect::Postgres
        } else if driver.contains("mysql") || driver.contains("mariadb") {
            Dialect::MySql
        } else if driver.contains("mssql") || driver.contains("sqlserver") {
            Dialect::MsSql
        } else if driver.contains("trino") {
            Dialect::Trino
        } else if driver.contains("sqlite") {
            Dialect::Sqlite
        } else if driver.contains("duckdb") {
            Dialect::DuckDb
        } else if driver.contains("oracle") {
            Dialect::Oracle
        } else {
            Dialect::Unknown
        }
    }

    /// Prefer a dialect recorded on query metadata (`db_dialect`), else the
    /// caller's fallback.
    pub fn from_query_metadata(db_dialect: Option<&str>, fallback: Dialect) -> Self {
        match db_dialect.map(str::trim).filter(|d| !d.is_empty()) {
            Some(name) => Dialect::from_name(name),
            None => fallback,
        }
    }

    /// Whether this is the fallback profile.
    pub fn is_unknown(self) -> bool {
        self == Dialect::Unknown
    }

    // =========================================================================
    // REWRITE STRATEGY
    // =========================================================================

    pub fn identifier_quoting(self) -> IdentifierQuoting {
        match self {
            Dialect::Trino => IdentifierQuoting::DoubleQuoted,
            Dialect::ClickHouse
            | Dialect::Postgres
            | Dialect::MySql
            | Dialect::Sqlite
            | Dialect::MsSql
            | Dialect::Oracle
            | Dialect::DuckDb
            | Dialect::Unknown => IdentifierQuoting::Bare,
        }
    }

    /// Render a sort identifier for the outer ORDER BY.
    pub fn quote_sort_identifier(self, ident: &str) -> String {
        match self.identifier_quoting() {
            IdentifierQuoting::DoubleQuoted => format!("\"{}\"", ident.replace('"', "\"\"")),
            IdentifierQuoting::Bare => ident.to_string(),
        }
    }

    /// Engines without stable implicit ordering need an explicit ORDER BY for
    /// pagination to be deterministic.
    pub fn requires_deterministic_order(self) -> bool {
        match self {
            Dialect::Trino => true,
            Dialect::ClickHouse
            | Dialect::Postgres
            | Dialect::MySql
            | Dialect::Sqlite
            | Dialect::MsSql
            | Dialect::Oracle
            | Dialect::DuckDb
            | Dialect::Unknown => false,
        }
    }

    pub fn count_strategy(self) -> CountStrategy {
        match self {
            // A windowed count can evaluate the inner query twice here.
            Dialect::Trino => CountStrategy::ScalarSubquery,
            Dialect::ClickHouse
            | Dialect::Postgres
            | Dialect::MySql
            | Dialect::Sqlite
            | Dialect::MsSql
            | Dialect::Oracle
            | Dialect::DuckDb
            | Dialect::Unknown => CountStrategy::WindowedCte,
        }
    }

    // =========================================================================
    // EXPLAIN AND ESTIMATES
    // =========================================================================

    /// EXPLAIN prefix for this engine. `structured` asks for machine-readable
    /// estimates where the engine has a dedicated form.
    pub fn explain_command(self, structured: bool) -> &'static str {
        match self {
            Dialect::ClickHouse if structured => "EXPLAIN ESTIMATE",
            Dialect::ClickHouse => "EXPLAIN",
            Dialect::Postgres | Dialect::MySql => "EXPLAIN",
            Dialect::Sqlite => "EXPLAIN QUERY PLAN",
            Dialect::Trino
            | Dialect::MsSql
            | Dialect::Oracle
            | Dialect::DuckDb
            | Dialect::Unknown => "EXPLAIN",
        }
    }

    pub fn estimate_format(self) -> EstimateFormat {
        match self {
            Dialect::ClickHouse => EstimateFormat::StructuredRows,
            Dialect::Trino => EstimateFormat::PlanText,
            Dialect::Postgres
            | Dialect::MySql
            | Dialect::Sqlite
            | Dialect::MsSql
            | Dialect::Oracle
            | Dialect::DuckDb
            | Dialect::Unknown => EstimateFormat::Unsupported,
        }
    }

    // =========================================================================
    // CATALOG INTROSPECTION
    // =========================================================================

    /// Efficient sampling query returning at most `limit` rows of `table`.
    pub fn sample_query(self, table: &str, limit: usize) -> String {
        match self {
            Dialect::ClickHouse => format!("SELECT * FROM {table} SAMPLE 0.01 LIMIT {limit}"),
            Dialect::Postgres => {
                format!("SELECT * FROM {table} TABLESAMPLE BERNOULLI (1) LIMIT {limit}")
            }
            Dialect::DuckDb => format!("SELECT * FROM {table} USING SAMPLE 1% LIMIT {limit}"),
            Dialect::MySql | Dialect::Sqlite => format!("SELECT * FROM {table} LIMIT {limit}"),
            Dialect::MsSql => format!("SELECT TOP {limit} * FROM {table}"),
            Dialect::Oracle => {
                format!("SELECT * FROM {table} SAMPLE (1) WHERE ROWNUM <= {limit}")
            }
            Dialect::Trino | Dialect::Unknown => format!("SELECT * FROM {table} LIMIT {limit}"),
        }
    }

    pub fn catalog_mode(self) -> CatalogMode {
        match self {
            Dialect::Trino => CatalogMode::Federated,
            Dialect::ClickHouse => CatalogMode::DatabaseAsCatalog,
            Dialect::Postgres
            | Dialect::MySql
            | Dialect::Sqlite
            | Dialect::MsSql
            | Dialect::Oracle
            | Dialect::DuckDb
            | Dialect::Unknown => CatalogMode::None,
        }
    }

    /// Built-in catalogs a federated engine reports alongside user catalogs.
    pub fn is_system_catalog(self, catalog: &str) -> bool {
        match self.catalog_mode() {
            CatalogMode::Federated => matches!(catalog, "system" | "information_schema"),
            CatalogMode::DatabaseAsCatalog | CatalogMode::None => false,
        }
    }

    /// Per-dialect system-schema denylist applied after schema listing.
    pub fn is_system_schema(self, schema: &str) -> bool {
        match self {
            Dialect::ClickHouse => {
                schema.starts_with('_')
                    || matches!(schema, "system" | "information_schema" | "INFORMATION_SCHEMA")
            }
            Dialect::Postgres => matches!(
                schema,
                "information_schema" | "pg_catalog" | "pg_toast" | "pg_temp_1"
            ),
            Dialect::MySql => matches!(
                schema,
                "information_schema" | "mysql" | "performance_schema" | "sys"
            ),
            Dialect::Trino => schema == "information_schema",
            Dialect::MsSql => matches!(schema, "INFORMATION_SCHEMA" | "sys"),
            Dialect::Sqlite | Dialect::Oracle | Dialect::DuckDb | Dialect::Unknown => false,
        }
    }

    /// Native catalog listing command, for federated engines.
    pub fn list_catalogs_command(self) -> Option<&'static str> {
        match self.catalog_mode() {
            CatalogMode::Federated => Some("SHOW CATALOGS"),
            CatalogMode::DatabaseAsCatalog | CatalogMode::None => None,
        }
    }

    /// Native catalog-scoped schema listing, for federated engines.
    pub fn list_schemas_command(self, catalog: &str) -> Option<String> {
        match self.catalog_mode() {
            CatalogMode::Federated => Some(format!("SHOW SCHEMAS FROM {catalog}")),
            CatalogMode::DatabaseAsCatalog | CatalogMode::None => None,
        }
    }

    /// Native catalog+schema scoped table listing, for federated engines.
    pub fn list_tables_command(self, catalog: &str, schema: &str) -> Option<String> {
        match self.catalog_mode() {
            CatalogMode::Federated => Some(format!("SHOW TABLES FROM {catalog}.{schema}")),
            CatalogMode::DatabaseAsCatalog | CatalogMode::None => None,
        }
    }

    /// Native column description command, for federated engines.
    pub fn describe_table_command(self, catalog: &str, schema: &str, table: &str) -> Option<String> {
        match self.catalog_mode() {
            CatalogMode::Federated => Some(format!("DESCRIBE {catalog}.{schema}.{table}")),
            CatalogMode::DatabaseAsCatalog | CatalogMode::None => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Dialect::from_name(s))
    }
}

impl From<String> for Dialect {
    fn from(value: String) -> Self {
        Dialect::from_name(&value)
    }
}

impl From<Dialect> for String {
    fn from(value: Dialect) -> Self {
        value.name().to_string()
    }
}
