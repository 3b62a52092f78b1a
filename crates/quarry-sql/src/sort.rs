//! Sort column validation against declared result columns.

use std::collections::HashMap;

use quarry_core::DeclaredColumn;
use thiserror::Error;

/// Why a requested sort column was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortColumnError {
    #[error("Query metadata not available - cannot validate sort column")]
    MetadataUnavailable,

    #[error("Query metadata has an empty column list - cannot validate sort column")]
    EmptyColumnList,

    #[error("No columns found in query metadata")]
    NoNamedColumns,

    #[error("Invalid sort column '{requested}'. Available columns: {}", .available.join(", "))]
    InvalidColumn {
        requested: String,
        /// Declared names, sorted.
        available: Vec<String>,
    },
}

/// Resolve `sort_by` case-insensitively against `columns`.
///
/// On success returns the declared spelling of the column, which is always
/// one of the supplied names.
pub fn validate_sort_column(
    sort_by: &str,
    columns: Option<&[DeclaredColumn]>,
) -> Result<String, SortColumnError> {
    let columns = columns.ok_or(SortColumnError::MetadataUnavailable)?;
    if columns.is_empty() {
        return Err(SortColumnError::EmptyColumnList);
    }

    let by_lower: HashMap<String, &str> = columns
        .iter()
        .filter_map(DeclaredColumn::name)
        .map(|name| (name.to_lowercase(), name))
        .collect();

    if by_lower.is_empty() {
        return Err(SortColumnError::NoNamedColumns);
    }

    match by_lower.get(&sort_by.to_lowercase()) {
        Some(declared) => {
            tracing::debug!(requested = %sort_by, resolved = %declared, "sort column resolved");
            Ok((*declared).to_string())
        }
        None => {
            let mut available: Vec<String> = by_lower.values().map(|s| s.to_string()).collect();
            available.sort();
            Err(SortColumnError::InvalidColumn {
                requested: sort_by.to_string(),
                available,
            })
        }
    }
}

/// [`validate_sort_column`] for loose JSON column objects.
pub fn validate_sort_column_values(
    sort_by: &str,
    columns: Option<&[serde_json::Value]>,
) -> Result<String, SortColumnError> {
    let declared = columns.map(DeclaredColumn::from_values);
    validate_sort_column(sort_by, declared.as_deref())
}
