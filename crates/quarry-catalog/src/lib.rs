//! # quarry-catalog
//!
//! Walks a warehouse's catalog → schema → table → column hierarchy and
//! merges what it finds with a human-authored description overlay.
//!
//! - Federated engines are listed with their native `SHOW` commands, every
//!   other engine through the client's generic introspection calls
//! - Overlay entries are matched most-specific first: `catalog.schema.table`,
//!   `schema.table`, `table`
//! - Hidden tables and columns never reach sample projections or rendered
//!   text
//! - A failing step prunes only its own branch

pub mod overlay;
pub mod render;
pub mod sample;
pub mod walker;

pub use overlay::{Visibility, apply_to_columns, resolve, table_visibility};
pub use render::render_schema_text;
pub use sample::{project_visible, query_table_name, sample_query};
pub use walker::{CatalogWalker, PrunedBranch, SchemaSnapshot, SnapshotTable, WalkStep};
