//! CLI command handlers for shade-catalog.
//!
//! This module provides headless, scriptable access to the catalog build
//! pipeline for automation and batch jobs.

pub mod add;
pub mod build;
pub mod classify;
pub mod common;
pub mod index;
pub mod inspect;

// Re-export types used by main.rs and tests
pub use add::AddArgs;
pub use build::BuildArgs;
pub use classify::ClassifyArgs;
pub use common::{CliContext, CliError, CliResult, ExitCode};
pub use index::IndexArgs;
pub use inspect::InspectArgs;
