//! Error types for the SQL crate.

use thiserror::Error;

/// Errors raised while parsing or validating SQL.
#[derive(Debug, Error)]
pub enum SqlError {
    /// SQL parsing failed.
    #[error("Failed to parse SQL: {message}. SQL: {excerpt}...")]
    ParseError { message: String, excerpt: String },

    /// The statement contains no SELECT to take result columns from.
    #[error("Could not find SELECT statement in SQL: {excerpt}...")]
    NoSelect { excerpt: String },

    /// Declared result columns disagree with the SQL.
    #[error("{}", render_metadata_failure(.errors, .warnings, .sql_columns, .metadata_columns))]
    MetadataValidation {
        errors: Vec<String>,
        warnings: Vec<String>,
        sql_columns: Vec<String>,
        metadata_columns: Vec<String>,
    },

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SqlError {
    pub(crate) fn parse(message: impl ToString, sql: &str) -> Self {
        SqlError::ParseError {
            message: message.to_string(),
            excerpt: excerpt(sql, 200),
        }
    }

    pub(crate) fn no_select(sql: &str) -> Self {
        SqlError::NoSelect {
            excerpt: excerpt(sql, 100),
        }
    }

    /// Whether the AST parser rejected the input.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, SqlError::ParseError { .. } | SqlError::NoSelect { .. })
    }
}

/// First `max_chars` characters of `sql`, on a char boundary.
pub(crate) fn excerpt(sql: &str, max_chars: usize) -> String {
    sql.chars().take(max_chars).collect()
}

fn render_metadata_failure(
    errors: &[String],
    warnings: &[String],
    sql_columns: &[String],
    metadata_columns: &[String],
) -> String {
    let mut msg = String::from("QueryMetadata validation failed:\n");
    msg.push_str(
        &errors
            .iter()
            .map(|e| format!("  - {e}"))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    if !warnings.is_empty() {
        msg.push_str("\nWarnings:\n");
        msg.push_str(
            &warnings
                .iter()
                .map(|w| format!("  - {w}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    msg.push_str(&format!(
        "\nSQL columns: [{}]\nMetadata columns: [{}]",
        sql_columns.join(", "),
        metadata_columns.join(", ")
    ));
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo", 2), "hé");
        assert_eq!(excerpt("abc", 10), "abc");
    }

    #[test]
    fn test_metadata_failure_message() {
        let err = SqlError::MetadataValidation {
            errors: vec!["first".into(), "second".into()],
            warnings: vec!["careful".into()],
            sql_columns: vec!["a".into()],
            metadata_columns: vec!["b".into()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("QueryMetadata validation failed:\n  - first\n  - second"));
        assert!(msg.contains("Warnings:\n  - careful"));
        assert!(msg.contains("SQL columns: [a]"));
        assert!(msg.contains("Metadata columns: [b]"));
        assert!(!err.is_parse_failure());
    }
}
