//! Shared CLI plumbing: error kinds, exit codes, and service construction.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::classifier::{Classifier, RuleSet};
use crate::config::Config;
use crate::errors::CatalogError;
use crate::models::ProductCategory;
use crate::services::{CatalogBuilder, CatalogService};
use crate::store::FsBlobStore;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Invalid input (bad category, hex, or rule table)
    ValidationError = 1,
    /// Store, file, or serialization failure
    IoError = 2,
}

impl ExitCode {
    /// Numeric code passed to `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// What went wrong, for exit code selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    /// Invalid input
    Validation,
    /// I/O failure
    Io,
}

/// A command failure with a user-facing message.
#[derive(Debug, Clone)]
pub struct CliError {
    /// Failure kind
    pub kind: CliErrorKind,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Invalid input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Validation,
            message: message.into(),
        }
    }

    /// I/O failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Io,
            message: message.into(),
        }
    }

    /// Exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self.kind {
            CliErrorKind::Validation => ExitCode::ValidationError,
            CliErrorKind::Io => ExitCode::IoError,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidHex { .. }
            | CatalogError::UnclassifiableDepth { .. }
            | CatalogError::Configuration(_) => Self::validation(err.to_string()),
            CatalogError::LoadFailure { .. }
            | CatalogError::Store(_)
            | CatalogError::Serialization(_) => Self::io(err.to_string()),
        }
    }
}

/// Result type for command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Global options resolved once per invocation.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Loaded configuration
    pub config: Config,
    /// Blob store root
    pub store_root: PathBuf,
}

impl CliContext {
    /// Resolves configuration and store root from the global flags.
    pub fn resolve(config_path: Option<&Path>, store: Option<&Path>) -> CliResult<Self> {
        let config = match config_path {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
        .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        let store_root = match store {
            Some(root) => root.to_path_buf(),
            None => config
                .store_root()
                .map_err(|e| CliError::io(format!("Failed to resolve store root: {e:#}")))?,
        };

        Ok(Self { config, store_root })
    }

    /// Builds the catalog service, optionally with a rule table from a JSON file.
    pub fn service(&self, rules: Option<&Path>) -> CliResult<CatalogService> {
        let builder = CatalogBuilder::new(
            load_classifier(rules)?,
            self.config.price_buckets(),
            self.config.backfill.min_per_bucket,
        );

        Ok(CatalogService::new(
            Arc::new(FsBlobStore::new(&self.store_root)),
            builder,
            self.config.source.data_prefix.clone(),
        ))
    }
}

/// The built-in classifier, or one over the rule table in `path`.
pub fn load_classifier(path: Option<&Path>) -> CliResult<Classifier> {
    let Some(path) = path else {
        return Ok(Classifier::default());
    };

    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("Failed to read rules {}: {e}", path.display())))?;
    let rules = RuleSet::from_json(&content)
        .map_err(|e| CliError::validation(format!("Invalid rules {}: {e}", path.display())))?;

    Ok(Classifier::new(rules))
}

/// Parses a category id or fails with a validation error.
pub fn parse_category(id: &str) -> CliResult<ProductCategory> {
    ProductCategory::parse(id).map_err(|e| CliError::validation(e.to_string()))
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::validation("x").exit_code().code(), 1);
        assert_eq!(CliError::io("x").exit_code().code(), 2);
        assert_eq!(ExitCode::Success.code(), 0);
    }

    #[test]
    fn test_catalog_error_mapping() {
        let err: CliError = CatalogError::InvalidHex {
            input: "#fff".to_string(),
        }
        .into();
        assert_eq!(err.kind, CliErrorKind::Validation);

        let err: CliError = CatalogError::LoadFailure {
            key: "k".to_string(),
            reason: "r".to_string(),
        }
        .into();
        assert_eq!(err.kind, CliErrorKind::Io);
    }

    #[test]
    fn test_load_classifier_rejects_bad_rules() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("rules.json");
        fs::write(&path, r#"{"rules": []}"#).unwrap();

        let err = load_classifier(Some(&path)).unwrap_err();
        assert_eq!(err.kind, CliErrorKind::Validation);
        assert!(load_classifier(None).is_ok());
    }
}
