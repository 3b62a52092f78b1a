//! `quarry validate` and `quarry syntax`.

use std::path::Path;

use quarry_sql::{SyntaxCheck, check_syntax, should_skip_syntax_check, validate_metadata_value};

use super::input::{SqlInput, read_json};
use super::{Settings, print_json};

pub fn run_validate(settings: &Settings, metadata: &Path) -> anyhow::Result<()> {
    let payload = read_json(metadata)?;
    let result = validate_metadata_value(&payload, settings.dialect);

    for warning in &result.warnings {
        tracing::warn!(file = %metadata.display(), "{warning}");
    }
    print_json(&result)?;

    if !result.valid {
        anyhow::bail!(
            "{} does not match its SQL ({} error(s))",
            metadata.display(),
            result.errors.len()
        );
    }
    Ok(())
}

pub fn run_syntax(settings: &Settings, input: &SqlInput, strict: bool) -> anyhow::Result<()> {
    let sql = input.read()?;
    let check = syntax_report(&sql, settings, strict);
    print_json(&check)?;

    if !check.valid {
        anyhow::bail!("SQL did not parse");
    }
    Ok(())
}

fn syntax_report(sql: &str, settings: &Settings, strict: bool) -> SyntaxCheck {
    if !strict && should_skip_syntax_check(sql) {
        tracing::info!(dialect = %settings.dialect, "engine-specific SQL, syntax check skipped");
        return SyntaxCheck {
            valid: true,
            error: None,
            warning: Some("Syntax check skipped for engine-specific SQL".to_string()),
        };
    }
    check_syntax(sql, settings.dialect, strict)
}
