//! `information_schema` listing for Postgres.

use quarry_core::ColumnDescriptor;
use sqlx::{PgPool, Row};

/// All schemas visible to the connected role, system schemas included; the
/// catalog walker applies the denylist.
pub async fn schema_names(pool: &PgPool) -> anyhow::Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        select schema_name
        from information_schema.schemata
        order by schema_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.get("schema_name")).collect())
}

/// Tables and views of `schema`, or of `current_schema()` when `None`.
pub async fn table_names(pool: &PgPool, schema: Option<&str>) -> anyhow::Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        select table_name
        from information_schema.tables
        where table_schema = coalesce($1::text, current_schema())
          and table_type in ('BASE TABLE', 'VIEW')
        order by table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.get("table_name")).collect())
}

/// Columns of a table in ordinal order.
pub async fn columns(
    pool: &PgPool,
    table: &str,
    schema: Option<&str>,
) -> anyhow::Result<Vec<ColumnDescriptor>> {
    let rows = sqlx::query(
        r#"
        select column_name, data_type
        from information_schema.columns
        where table_schema = coalesce($1::text, current_schema())
          and table_name = $2
        order by ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        anyhow::bail!(
            "table '{}' not found in schema '{}'",
            table,
            schema.unwrap_or("current_schema()")
        );
    }

    Ok(rows
        .into_iter()
        .map(|r| {
            let column_name: String = r.get("column_name");
            let data_type: String = r.get("data_type");
            ColumnDescriptor::new(column_name, data_type)
        })
        .collect())
}
