//! SQL text from the command line, a file, or stdin.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct SqlInput {
    /// SQL text. Read from --file or stdin when omitted.
    pub sql: Option<String>,

    /// File holding the SQL
    #[arg(long, conflicts_with = "sql")]
    pub file: Option<PathBuf>,
}

impl SqlInput {
    pub fn read(&self) -> anyhow::Result<String> {
        if let Some(sql) = &self.sql {
            return Ok(sql.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }

        let mut sql = String::new();
        std::io::stdin()
            .read_to_string(&mut sql)
            .context("failed to read SQL from stdin")?;
        if sql.trim().is_empty() {
            anyhow::bail!("no SQL given: pass it as an argument, with --file, or on stdin");
        }
        Ok(sql)
    }
}

/// Read and parse a JSON file.
pub fn read_json(path: &std::path::Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_sql() {
        let input = SqlInput {
            sql: Some("SELECT 1".into()),
            file: None,
        };
        assert_eq!(input.read().unwrap(), "SELECT 1");
    }

    #[test]
    fn test_sql_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.sql");
        std::fs::write(&path, "SELECT a FROM t;\n").unwrap();

        let input = SqlInput {
            sql: None,
            file: Some(path),
        };
        assert_eq!(input.read().unwrap(), "SELECT a FROM t;\n");
    }

    #[test]
    fn test_read_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_json(&path).unwrap_err();
        assert!(err.to_string().contains("plan.json"));
    }
}
