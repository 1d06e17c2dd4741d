//! Data-driven HSV label rules.
//!
//! A [`RuleSet`] is an ordered table of `(label, predicate, depth bands)`.
//! Adding or retuning a label is a data change: the table can be replaced by a
//! JSON document with the same shape as [`RuleSet::default`] serializes to.

use serde::{Deserialize, Serialize};

use crate::errors::{CatalogError, CatalogResult};
use crate::models::{CategoryLabel, DepthTier, Hsv};

/// A range over one HSV channel. Unset bounds are open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Whether `min` itself is inside the interval
    #[serde(default)]
    pub min_inclusive: bool,
    /// Upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Whether `max` itself is inside the interval
    #[serde(default)]
    pub max_inclusive: bool,
}

impl Interval {
    /// Matches every value.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            min: None,
            min_inclusive: false,
            max: None,
            max_inclusive: false,
        }
    }

    /// `x > min`
    #[must_use]
    pub fn gt(min: f64) -> Self {
        Self::any().with_min(min, false)
    }

    /// `x >= min`
    #[must_use]
    pub fn ge(min: f64) -> Self {
        Self::any().with_min(min, true)
    }

    /// `x < max`
    #[must_use]
    pub fn lt(max: f64) -> Self {
        Self::any().with_max(max, false)
    }

    /// `x <= max`
    #[must_use]
    pub fn le(max: f64) -> Self {
        Self::any().with_max(max, true)
    }

    /// `min <= x <= max`
    #[must_use]
    pub fn closed(min: f64, max: f64) -> Self {
        Self::ge(min).with_max(max, true)
    }

    /// `min < x < max`
    #[must_use]
    pub fn open(min: f64, max: f64) -> Self {
        Self::gt(min).with_max(max, false)
    }

    /// Replaces the lower bound.
    #[must_use]
    pub fn with_min(mut self, min: f64, inclusive: bool) -> Self {
        self.min = Some(min);
        self.min_inclusive = inclusive;
        self
    }

    /// Replaces the upper bound.
    #[must_use]
    pub fn with_max(mut self, max: f64, inclusive: bool) -> Self {
        self.max = Some(max);
        self.max_inclusive = inclusive;
        self
    }

    /// Tests a channel value against both bounds.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        let above_min = match self.min {
            Some(min) if self.min_inclusive => x >= min,
            Some(min) => x > min,
            None => true,
        };
        let below_max = match self.max {
            Some(max) if self.max_inclusive => x <= max,
            Some(max) => x < max,
            None => true,
        };
        above_min && below_max
    }
}

/// Conjunction of per-channel intervals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HsvClause {
    /// Hue interval (degrees)
    #[serde(default)]
    pub hue: Interval,
    /// Saturation interval (percent)
    #[serde(default)]
    pub saturation: Interval,
    /// Value interval (percent)
    #[serde(default)]
    pub value: Interval,
}

impl HsvClause {
    /// Builds a clause from three intervals.
    #[must_use]
    pub const fn new(hue: Interval, saturation: Interval, value: Interval) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// True when every channel is inside its interval.
    #[must_use]
    pub fn matches(&self, hsv: &Hsv) -> bool {
        self.hue.contains(hsv.hue)
            && self.saturation.contains(hsv.saturation)
            && self.value.contains(hsv.value)
    }
}

/// When a label fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HsvPredicate {
    /// Fires for every color (catch-all labels).
    Always,
    /// Fires when at least one clause matches.
    AnyOf {
        /// Alternative clauses
        clauses: Vec<HsvClause>,
    },
}

impl HsvPredicate {
    /// Tests a color against the predicate.
    #[must_use]
    pub fn matches(&self, hsv: &Hsv) -> bool {
        match self {
            Self::Always => true,
            Self::AnyOf { clauses } => clauses.iter().any(|clause| clause.matches(hsv)),
        }
    }
}

/// Inclusive `[min, max]` brightness band mapped to a depth tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthBand {
    /// Lowest rounded value in the band
    pub min: u8,
    /// Highest rounded value in the band
    pub max: u8,
    /// Tier assigned to values in the band
    pub tier: DepthTier,
}

impl DepthBand {
    /// Creates a band.
    #[must_use]
    pub const fn new(min: u8, max: u8, tier: DepthTier) -> Self {
        Self { min, max, tier }
    }
}

/// One label of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRule {
    /// Taxonomy label emitted when the predicate fires
    pub label: CategoryLabel,
    /// HSV gate
    pub predicate: HsvPredicate,
    /// Brightness bands, searched in order; gaps mean "no tier"
    pub bands: Vec<DepthBand>,
}

impl LabelRule {
    /// First band containing `value`, if any.
    #[must_use]
    pub fn depth_for(&self, value: u8) -> Option<DepthTier> {
        self.bands
            .iter()
            .find(|band| value >= band.min && value <= band.max)
            .map(|band| band.tier)
    }
}

/// Ordered rule table, immutable once built and injected into the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rules in evaluation (and emission) order
    pub rules: Vec<LabelRule>,
}

impl RuleSet {
    /// Parses and validates a rule table from JSON.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Checks labels are non-empty and unique and bands are well-formed.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.rules.is_empty() {
            return Err(CatalogError::Configuration(
                "rule set must contain at least one label".to_string(),
            ));
        }

        for (i, rule) in self.rules.iter().enumerate() {
            if rule.label.as_str().trim().is_empty() {
                return Err(CatalogError::Configuration(format!(
                    "rule #{i} has an empty label"
                )));
            }
            if self.rules[..i].iter().any(|r| r.label == rule.label) {
                return Err(CatalogError::Configuration(format!(
                    "duplicate rule label '{}'",
                    rule.label
                )));
            }
            if let Some(band) = rule.bands.iter().find(|b| b.min > b.max || b.max > 100) {
                return Err(CatalogError::Configuration(format!(
                    "rule '{}' has an invalid band [{}, {}]",
                    rule.label, band.min, band.max
                )));
            }
        }

        Ok(())
    }

    /// Looks up a rule by label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&LabelRule> {
        self.rules.iter().find(|rule| rule.label.as_str() == label)
    }
}

impl Default for RuleSet {
    /// The built-in cosmetics table. The catch-all label comes last.
    fn default() -> Self {
        use DepthTier::{D, L, M};

        let mid_bands = vec![
            DepthBand::new(40, 59, D),
            DepthBand::new(60, 74, M),
            DepthBand::new(75, 100, L),
        ];

        let rules = vec![
            LabelRule {
                label: CategoryLabel::new(CategoryLabel::DAILY_NEUTRALS),
                predicate: HsvPredicate::AnyOf {
                    clauses: vec![HsvClause::new(
                        Interval::any(),
                        Interval::open(40.0, 65.0),
                        Interval::open(35.0, 70.0),
                    )],
                },
                bands: mid_bands.clone(),
            },
            LabelRule {
                label: CategoryLabel::new(CategoryLabel::PERFECT_PINKS),
                predicate: HsvPredicate::AnyOf {
                    clauses: vec![
                        // Wraparound either side of 0 degrees
                        HsvClause::new(
                            Interval::le(8.0),
                            Interval::closed(25.0, 75.0),
                            Interval::ge(40.0),
                        ),
                        HsvClause::new(
                            Interval::ge(350.0),
                            Interval::closed(25.0, 75.0),
                            Interval::ge(40.0),
                        ),
                        HsvClause::new(
                            Interval::ge(325.0).with_max(350.0, false),
                            Interval::ge(40.0),
                            Interval::ge(50.0),
                        ),
                    ],
                },
                bands: mid_bands,
            },
            LabelRule {
                label: CategoryLabel::new(CategoryLabel::BOLD_AND_DEEP),
                predicate: HsvPredicate::AnyOf {
                    clauses: vec![HsvClause::new(
                        Interval::any(),
                        Interval::gt(55.0),
                        Interval::lt(50.0),
                    )],
                },
                bands: vec![
                    DepthBand::new(0, 25, D),
                    DepthBand::new(26, 35, M),
                    DepthBand::new(36, 50, L),
                ],
            },
            LabelRule {
                label: CategoryLabel::new(CategoryLabel::BRIGHT_AND_FUN),
                predicate: HsvPredicate::AnyOf {
                    clauses: vec![HsvClause::new(
                        Interval::any(),
                        Interval::gt(75.0),
                        Interval::gt(75.0),
                    )],
                },
                bands: vec![
                    DepthBand::new(75, 80, D),
                    DepthBand::new(81, 90, M),
                    DepthBand::new(91, 100, L),
                ],
            },
            LabelRule {
                label: CategoryLabel::new(CategoryLabel::REDS_AND_BROWNS),
                predicate: HsvPredicate::AnyOf {
                    clauses: vec![HsvClause::new(
                        Interval::closed(0.0, 15.0),
                        Interval::gt(70.0),
                        Interval::lt(70.0),
                    )],
                },
                bands: vec![
                    DepthBand::new(0, 55, D),
                    DepthBand::new(56, 65, M),
                    DepthBand::new(66, 80, L),
                ],
            },
            LabelRule {
                label: CategoryLabel::new(CategoryLabel::RANDOM),
                predicate: HsvPredicate::Always,
                // 50 and 70 sit in two bands; the darker one wins
                bands: vec![
                    DepthBand::new(0, 50, D),
                    DepthBand::new(50, 70, M),
                    DepthBand::new(70, 100, L),
                ],
            },
        ];

        Self { rules }
    }
}
