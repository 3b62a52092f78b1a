//! `quarry describe`: walk the warehouse and print what it holds.

use quarry_catalog::{CatalogWalker, render_schema_text};

use super::{Settings, connect, print_json};

pub async fn run_describe(settings: &Settings, with_examples: bool, json: bool) -> anyhow::Result<()> {
    let overlay = settings.config.overlay()?;
    let client = connect(settings).await?;

    let mut options = settings.config.catalog.clone();
    options.with_examples |= with_examples;

    let snapshot = CatalogWalker::new(&client, settings.dialect, &overlay)
        .with_options(options)
        .walk()
        .await;

    if !snapshot.pruned.is_empty() {
        tracing::warn!(
            pruned = snapshot.pruned.len(),
            "some catalog branches could not be read"
        );
    }

    if json {
        print_json(&snapshot)
    } else {
        print!("{}", render_schema_text(&snapshot));
        Ok(())
    }
}
