//! Service layer for business logic.
//!
//! This module contains services that encapsulate the build pipeline
//! and coordinate between the core and the blob store.

pub mod builder;
pub mod catalog;
pub mod inventory;

// Re-export commonly used types
pub use builder::{BuildReport, CatalogBuilder};
pub use catalog::{
    AddReport, CatalogService, ConsideredProduct, RebuildOptions, RebuildReport, RebuildSummary,
};
pub use inventory::{InventoryService, ProductRef};
