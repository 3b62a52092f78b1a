use async_trait::async_trait;

use crate::types::{ColumnDescriptor, RowSet};

/// Live warehouse access used by catalog walking and EXPLAIN preflight.
///
/// Implementations own one short-lived connection; every method is an
/// independent call that may fail without affecting the others.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Database named in the connection configuration (URL path), if any.
    fn configured_database(&self) -> Option<String>;

    /// Run a raw statement and return its rows.
    async fn query(&self, sql: &str) -> anyhow::Result<RowSet>;

    /// Generic schema listing.
    async fn schema_names(&self) -> anyhow::Result<Vec<String>>;

    /// Generic table listing, scoped to `schema` when given.
    async fn table_names(&self, schema: Option<&str>) -> anyhow::Result<Vec<String>>;

    /// Generic column listing in ordinal order.
    async fn columns(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> anyhow::Result<Vec<ColumnDescriptor>>;
}
