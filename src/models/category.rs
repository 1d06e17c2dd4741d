//! Taxonomy category labels and requested product categories.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CatalogError, CatalogResult};

/// Top-level key of a taxonomy document.
///
/// Usually one of the HSV labels below or a base category name, but contour
/// documents key on the finish value, so the set is open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryLabel(String);

impl CategoryLabel {
    /// Moderately saturated, moderately bright colors.
    pub const DAILY_NEUTRALS: &'static str = "daily-neutrals";
    /// Hues around the red/magenta wraparound.
    pub const PERFECT_PINKS: &'static str = "perfect-pinks";
    /// Saturated, dark colors.
    pub const BOLD_AND_DEEP: &'static str = "bold-and-deep";
    /// Saturated, bright colors.
    pub const BRIGHT_AND_FUN: &'static str = "bright-and-fun";
    /// Narrow low-hue band of saturated, darker colors.
    pub const REDS_AND_BROWNS: &'static str = "reds-and-browns";
    /// Catch-all label every valid shade receives.
    pub const RANDOM: &'static str = "random";
    /// Label used for contour shades without a finish.
    pub const ANY_FINISH: &'static str = "any";

    /// Wraps a label string.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryLabel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Base complexion categories, classified by skin-depth hint only.
pub const BASE_CATEGORIES: [&str; 3] = ["foundation", "concealer", "skin-tint"];

/// Contour category, keyed by finish and classified by skin-depth hint.
pub const CONTOUR_CATEGORY: &str = "contour";

/// Lip categories whose products need edited final shades before they are catalogued.
pub const LIP_CATEGORIES: [&str; 6] = [
    "matte-lipstick",
    "satin-lipstick",
    "lip-gloss",
    "lip-tint",
    "lip-balm",
    "lip-oil",
];

/// A requested product category together with the classification policy it selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    /// `foundation`, `concealer`, `skin-tint`
    Base(String),
    /// `contour`
    Contour,
    /// Any other category (lipsticks, blushes, ...), classified from HSV.
    General(String),
}

impl ProductCategory {
    /// Parses and validates a requested category id.
    ///
    /// Ids are kebab-case (lowercase ASCII letters, digits, and inner hyphens);
    /// they are also used as blob-store path segments.
    ///
    /// # Examples
    ///
    /// ```
    /// use shade_catalog::models::ProductCategory;
    ///
    /// assert_eq!(ProductCategory::parse("contour").unwrap(), ProductCategory::Contour);
    /// assert!(ProductCategory::parse("Lip Gloss").is_err());
    /// ```
    pub fn parse(id: &str) -> CatalogResult<Self> {
        Self::validate_id(id)?;

        Ok(if BASE_CATEGORIES.contains(&id) {
            Self::Base(id.to_string())
        } else if id == CONTOUR_CATEGORY {
            Self::Contour
        } else {
            Self::General(id.to_string())
        })
    }

    /// Validates category id format (kebab-case).
    fn validate_id(id: &str) -> CatalogResult<()> {
        if id.is_empty() {
            return Err(CatalogError::Configuration(
                "Category ID cannot be empty".to_string(),
            ));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(CatalogError::Configuration(format!(
                "Category ID '{id}' must be kebab-case (lowercase, hyphens, and digits only)"
            )));
        }

        if id.starts_with('-') || id.ends_with('-') {
            return Err(CatalogError::Configuration(format!(
                "Category ID '{id}' cannot start or end with a hyphen"
            )));
        }

        Ok(())
    }

    /// The category id as requested.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Base(id) | Self::General(id) => id,
            Self::Contour => CONTOUR_CATEGORY,
        }
    }

    /// True for lip categories.
    #[must_use]
    pub fn is_lip(&self) -> bool {
        LIP_CATEGORIES.contains(&self.id())
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
