//! Description overlay resolution and visibility rules.

use quarry_core::{CatalogPath, ColumnDescriptor, OverlayScope, TableOverlay};

/// Find the overlay entry for `path`: `catalog.schema.table`, then
/// `schema.table`, then `table`. The first hit wins.
pub fn resolve<'a>(scope: &'a OverlayScope, path: &CatalogPath) -> Option<&'a TableOverlay> {
    path.lookup_keys()
        .iter()
        .find_map(|key| scope.tables.get(key.as_str()))
}

/// Why a table is or is not shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Whitelist mode and no overlay entry.
    NotWhitelisted,
    /// The overlay entry marks the table hidden.
    Hidden,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

pub fn table_visibility(scope: &OverlayScope, resolved: Option<&TableOverlay>) -> Visibility {
    match resolved {
        None if scope.whitelist => Visibility::NotWhitelisted,
        Some(entry) if entry.hidden => Visibility::Hidden,
        _ => Visibility::Visible,
    }
}

/// Merge overlay descriptions, examples and hidden flags onto introspected
/// columns. Introspection order is kept.
pub fn apply_to_columns(
    columns: Vec<ColumnDescriptor>,
    resolved: Option<&TableOverlay>,
) -> Vec<ColumnDescriptor> {
    let Some(entry) = resolved else {
        return columns;
    };

    columns
        .into_iter()
        .map(|mut column| {
            if let Some(overlay) = entry.column(&column.name) {
                if overlay.description.is_some() {
                    column.description = overlay.description.clone();
                }
                if overlay.example.is_some() {
                    column.example = overlay.example.clone();
                }
                column.hidden |= overlay.hidden;
            }
            column
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::ColumnOverlay;

    #[test]
    fn test_short_name_fallback() {
        let scope = OverlayScope::default().with_table("orders", TableOverlay::described("short"));
        let path = CatalogPath::new(Some("c1"), Some("public"), "orders");
        assert_eq!(
            resolve(&scope, &path).and_then(|t| t.description.as_deref()),
            Some("short")
        );
    }

    #[test]
    fn test_most_specific_wins() {
        let scope = OverlayScope::default()
            .with_table("orders", TableOverlay::described("short"))
            .with_table("public.orders", TableOverlay::described("schema"))
            .with_table("c1.public.orders", TableOverlay::described("full"));
        let path = CatalogPath::new(Some("c1"), Some("public"), "orders");
        assert_eq!(
            resolve(&scope, &path).and_then(|t| t.description.as_deref()),
            Some("full")
        );

        let other_catalog = CatalogPath::new(Some("c2"), Some("public"), "orders");
        assert_eq!(
            resolve(&scope, &other_catalog).and_then(|t| t.description.as_deref()),
            Some("schema")
        );
    }

    #[test]
    fn test_not_found() {
        let scope = OverlayScope::default().with_table("orders", TableOverlay::default());
        assert!(resolve(&scope, &CatalogPath::new(None, None, "users")).is_none());
    }

    #[test]
    fn test_visibility() {
        let mut scope = OverlayScope::default();
        let hidden = TableOverlay {
            hidden: true,
            ..TableOverlay::default()
        };
        let plain = TableOverlay::default();

        assert_eq!(table_visibility(&scope, None), Visibility::Visible);
        assert_eq!(table_visibility(&scope, Some(&hidden)), Visibility::Hidden);

        scope.whitelist = true;
        assert_eq!(table_visibility(&scope, None), Visibility::NotWhitelisted);
        assert_eq!(table_visibility(&scope, Some(&plain)), Visibility::Visible);
        assert_eq!(table_visibility(&scope, Some(&hidden)), Visibility::Hidden);
    }

    #[test]
    fn test_apply_to_columns() {
        let mut entry = TableOverlay::default();
        entry.columns.insert(
            "amount".into(),
            ColumnOverlay {
                description: Some("Order total".into()),
                example: Some("19.99".into()),
                hidden: false,
            },
        );
        entry.columns.insert(
            "secret".into(),
            ColumnOverlay {
                hidden: true,
                ..ColumnOverlay::default()
            },
        );

        let columns = apply_to_columns(
            vec![
                ColumnDescriptor::new("id", "integer"),
                ColumnDescriptor::new("amount", "numeric"),
                ColumnDescriptor::new("secret", "text"),
            ],
            Some(&entry),
        );

        assert_eq!(columns[0], ColumnDescriptor::new("id", "integer"));
        assert_eq!(columns[1].description.as_deref(), Some("Order total"));
        assert_eq!(columns[1].example.as_deref(), Some("19.99"));
        assert!(columns[2].hidden);
    }
}
