// Dialect model: one strategy table per dialect-dependent operation
pub mod dialect;

// Data model shared across Quarry crates
pub mod types;

// External warehouse client boundary
pub mod client;

// Configuration types shared across all Quarry crates
pub mod config;

pub use client::WarehouseClient;
pub use config::{
    CatalogConfig, ColumnOverlay, ConfigError, DescriptionsFile, EstimateAssessment,
    EstimateThresholds, EstimatesConfig, OverlayScope, QuarryConfig, TableOverlay,
    WarehouseConfig,
};
pub use dialect::{CatalogMode, CountStrategy, Dialect, EstimateFormat, IdentifierQuoting};
pub use types::{
    CatalogPath, ColumnDescriptor, DeclaredColumn, QueryPlanEstimate, RowSet, SortOrder,
    TableDescriptor, ValidationResult,
};
