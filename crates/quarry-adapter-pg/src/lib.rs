use async_trait::async_trait;
use quarry_core::config::warehouse::database_from_url;
use quarry_core::{ColumnDescriptor, RowSet, WarehouseClient, WarehouseConfig};
use serde_json::{Value, json};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, Executor, PgPool, Row};

pub mod introspect;

/// [`WarehouseClient`] over a Postgres connection pool.
pub struct PgWarehouseClient {
    pool: PgPool,
    database: Option<String>,
}

impl PgWarehouseClient {
    pub async fn connect(config: &WarehouseConfig) -> anyhow::Result<Self> {
        let url = config.connection_string();
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&url)
            .await?;
        tracing::debug!(database = ?config.database_name(), "connected to postgres");
        Ok(Self {
            pool,
            database: config.database_name(),
        })
    }

    pub fn from_pool(pool: PgPool, database_url: &str) -> Self {
        Self {
            pool,
            database: database_from_url(database_url),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WarehouseClient for PgWarehouseClient {
    fn configured_database(&self) -> Option<String> {
        self.database.clone()
    }

    async fn query(&self, sql: &str) -> anyhow::Result<RowSet> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        let columns: Vec<String> = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            // No rows to read names from; ask the server for the shape.
            None => (&self.pool)
                .describe(sql)
                .await?
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        };

        let values = rows.iter().map(row_to_values).collect();
        Ok(RowSet::new(columns, values))
    }

    async fn schema_names(&self) -> anyhow::Result<Vec<String>> {
        introspect::schema_names(&self.pool).await
    }

    async fn table_names(&self, schema: Option<&str>) -> anyhow::Result<Vec<String>> {
        introspect::table_names(&self.pool, schema).await
    }

    async fn columns(&self, table: &str, schema: Option<&str>) -> anyhow::Result<Vec<ColumnDescriptor>> {
        introspect::columns(&self.pool, table, schema).await
    }
}

/// Decode every column of a row into JSON.
fn row_to_values(row: &PgRow) -> Vec<Value> {
    (0..row.columns().len()).map(|idx| column_to_json(row, idx)).collect()
}

/// Try the common Postgres types in turn; anything undecodable becomes
/// `null`.
fn column_to_json(row: &PgRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(idx) {
        return v.unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v.to_rfc3339()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<sqlx::types::Uuid>, _>(idx) {
        return v.map_or(Value::Null, |v| json!(v.to_string()));
    }
    Value::Null
}
