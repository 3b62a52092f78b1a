//! Preflight EXPLAIN against an in-memory client.

use std::sync::Mutex;

use async_trait::async_trait;
use quarry_core::{ColumnDescriptor, Dialect, RowSet, WarehouseClient};
use quarry_sql::preflight;
use serde_json::json;

/// Records the statements it receives and answers with a fixed result.
struct ScriptedClient {
    reply: Result<RowSet, String>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(reply: Result<RowSet, String>) -> Self {
        Self {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WarehouseClient for ScriptedClient {
    fn configured_database(&self) -> Option<String> {
        None
    }

    async fn query(&self, sql: &str) -> anyhow::Result<RowSet> {
        self.seen.lock().unwrap().push(sql.to_string());
        self.reply.clone().map_err(|e| anyhow::anyhow!(e))
    }

    async fn schema_names(&self) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn table_names(&self, _schema: Option<&str>) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn columns(&self, _table: &str, _schema: Option<&str>) -> anyhow::Result<Vec<ColumnDescriptor>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_preflight_structured_estimate() {
    let client = ScriptedClient::new(Ok(RowSet::new(
        vec!["database".into(), "table".into(), "rows".into()],
        vec![vec![json!("default"), json!("trades"), json!(4096)]],
    )));

    let result = preflight(&client, Dialect::ClickHouse, "SELECT * FROM trades;", true).await;

    assert!(result.is_ok());
    assert_eq!(
        client.seen.lock().unwrap().as_slice(),
        ["EXPLAIN ESTIMATE SELECT * FROM trades"]
    );
    assert_eq!(result.explanation.len(), 1);
    assert_eq!(result.estimate.unwrap().estimated_rows, Some(4096));
}

#[tokio::test]
async fn test_preflight_failure_is_reported_not_raised() {
    let client = ScriptedClient::new(Err("Table trades does not exist".into()));

    let result = preflight(&client, Dialect::Trino, "SELECT * FROM trades", false).await;

    assert!(!result.is_ok());
    assert_eq!(
        result.error.as_deref(),
        Some("SQL error: Table trades does not exist")
    );
    assert!(result.estimate.is_none());
    assert!(result.explanation.is_empty());
}
