//! Multi-label shade classification.
//!
//! Three disjoint policies, selected by the requested [`ProductCategory`]:
//!
//! - **Base** (`foundation`, `concealer`, `skin-tint`): one label, the category
//!   itself; depth comes from the skin-depth hint.
//! - **Contour**: one label, the finish value (`"any"` when missing); depth
//!   comes from the skin-depth hint.
//! - **General**: every [`RuleSet`] rule whose HSV predicate fires emits its
//!   label, with depth looked up in that rule's own brightness bands.
//!
//! A placement without a depth tier cannot be stored; see [`Placement::placed`].

pub mod rules;

pub use rules::{DepthBand, HsvClause, HsvPredicate, Interval, LabelRule, RuleSet};

use crate::errors::{CatalogError, CatalogResult};
use crate::models::{CategoryLabel, DepthTier, Hsv, ProductCategory, ShadeRecord, SkinDepth};

/// Optional attributes that steer base and contour classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadeHints<'a> {
    /// Skin-depth hint code (F, FM, MD, D1, D2, VD)
    pub skintone: Option<&'a str>,
    /// Coverage attribute
    pub coverage: Option<&'a str>,
    /// Finish attribute; the contour label
    pub finish: Option<&'a str>,
}

impl<'a> ShadeHints<'a> {
    /// Borrows the hints carried by a record.
    #[must_use]
    pub fn from_record(record: &'a ShadeRecord) -> Self {
        Self {
            skintone: record.skintone.as_deref(),
            coverage: record.coverage.as_deref(),
            finish: record.finish.as_deref(),
        }
    }
}

/// A label the shade qualifies for, with its depth tier when one is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Taxonomy label
    pub label: CategoryLabel,
    /// Depth tier, `None` when the value or hint falls outside every band
    pub depth: Option<DepthTier>,
    /// What the depth was derived from (rounded value or hint), for diagnostics
    pub basis: String,
}

impl Placement {
    /// The depth tier, or `UnclassifiableDepth` when there is none.
    pub fn placed(&self) -> CatalogResult<DepthTier> {
        self.depth.ok_or_else(|| CatalogError::UnclassifiableDepth {
            label: self.label.to_string(),
            value: self.basis.clone(),
        })
    }
}

/// Rule-driven classifier. Holds an immutable rule table.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: RuleSet,
}

impl Classifier {
    /// Creates a classifier over a rule table.
    #[must_use]
    pub const fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// The rule table in use.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Classifies one color. Always returns a list; base and contour shades
    /// with an unrecognized hint yield a single placement without a depth.
    ///
    /// # Examples
    ///
    /// ```
    /// use shade_catalog::classifier::{Classifier, ShadeHints};
    /// use shade_catalog::models::{hsv_from_hex, ProductCategory};
    ///
    /// let classifier = Classifier::default();
    /// let hsv = hsv_from_hex("#8b0000").unwrap();
    /// let category = ProductCategory::parse("lip-gloss").unwrap();
    /// let labels: Vec<String> = classifier
    ///     .classify(&hsv, &category, &ShadeHints::default())
    ///     .into_iter()
    ///     .map(|p| p.label.to_string())
    ///     .collect();
    /// assert_eq!(labels, ["reds-and-browns", "random"]);
    /// ```
    #[must_use]
    pub fn classify(
        &self,
        hsv: &Hsv,
        category: &ProductCategory,
        hints: &ShadeHints<'_>,
    ) -> Vec<Placement> {
        match category {
            ProductCategory::Base(id) => vec![Self::skin_depth_placement(
                CategoryLabel::new(id.as_str()),
                hints,
            )],
            ProductCategory::Contour => {
                let finish = hints
                    .finish
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .unwrap_or(CategoryLabel::ANY_FINISH);
                vec![Self::skin_depth_placement(CategoryLabel::new(finish), hints)]
            }
            ProductCategory::General(_) => self.hsv_placements(hsv),
        }
    }

    fn skin_depth_placement(label: CategoryLabel, hints: &ShadeHints<'_>) -> Placement {
        let hint = hints.skintone.unwrap_or_default();
        Placement {
            label,
            depth: SkinDepth::parse(hint).map(SkinDepth::depth_tier),
            basis: format!("skintone '{hint}'"),
        }
    }

    fn hsv_placements(&self, hsv: &Hsv) -> Vec<Placement> {
        let value = hsv.rounded_value();
        self.rules
            .rules
            .iter()
            .filter(|rule| rule.predicate.matches(hsv))
            .map(|rule| Placement {
                label: rule.label.clone(),
                depth: rule.depth_for(value),
                basis: format!("value {value}"),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hsv_from_hex;

    fn general() -> ProductCategory {
        ProductCategory::parse("lip-gloss").unwrap()
    }

    fn labels(placements: &[Placement]) -> Vec<(&str, Option<DepthTier>)> {
        placements
            .iter()
            .map(|p| (p.label.as_str(), p.depth))
            .collect()
    }

    #[test]
    fn test_pale_pink_is_pink_and_light() {
        let classifier = Classifier::default();
        let hsv = hsv_from_hex("#ffb6c1").unwrap();
        let placements = classifier.classify(&hsv, &general(), &ShadeHints::default());

        assert_eq!(
            labels(&placements),
            vec![
                (CategoryLabel::PERFECT_PINKS, Some(DepthTier::L)),
                (CategoryLabel::RANDOM, Some(DepthTier::L)),
            ]
        );
    }

    #[test]
    fn test_dark_red_is_red_and_dark() {
        let classifier = Classifier::default();
        let hsv = hsv_from_hex("#8b0000").unwrap();
        let placements = classifier.classify(&hsv, &general(), &ShadeHints::default());

        assert_eq!(
            labels(&placements),
            vec![
                (CategoryLabel::REDS_AND_BROWNS, Some(DepthTier::D)),
                (CategoryLabel::RANDOM, Some(DepthTier::M)),
            ]
        );
    }

    #[test]
    fn test_multi_label_bold_and_red() {
        // hsv(0, 100, ~40): dark saturated red is both bold and red/brown
        let classifier = Classifier::default();
        let hsv = hsv_from_hex("#660000").unwrap();
        let placements = classifier.classify(&hsv, &general(), &ShadeHints::default());

        assert_eq!(
            labels(&placements),
            vec![
                (CategoryLabel::BOLD_AND_DEEP, Some(DepthTier::L)),
                (CategoryLabel::REDS_AND_BROWNS, Some(DepthTier::D)),
                (CategoryLabel::RANDOM, Some(DepthTier::D)),
            ]
        );
    }

    #[test]
    fn test_random_always_last() {
        let classifier = Classifier::default();
        for hex in ["#000000", "#ffffff", "#12ab34", "#ff00ff", "#c08070"] {
            let hsv = hsv_from_hex(hex).unwrap();
            let placements = classifier.classify(&hsv, &general(), &ShadeHints::default());
            assert_eq!(
                placements.last().map(|p| p.label.as_str()),
                Some(CategoryLabel::RANDOM),
                "{hex} should end with the catch-all label"
            );
        }
    }

    #[test]
    fn test_bright_and_fun_placement() {
        let classifier = Classifier::default();

        // hsv(60, 100, 100)
        let yellow = hsv_from_hex("#ffff00").unwrap();
        assert_eq!(
            labels(&classifier.classify(&yellow, &general(), &ShadeHints::default())),
            vec![
                (CategoryLabel::BRIGHT_AND_FUN, Some(DepthTier::L)),
                (CategoryLabel::RANDOM, Some(DepthTier::L)),
            ]
        );

        // hsv(~322, ~89, ~78): bright but in its darkest band, not pink
        let violet_red = hsv_from_hex("#c71585").unwrap();
        assert_eq!(violet_red.rounded_value(), 78);
        assert_eq!(
            labels(&classifier.classify(&violet_red, &general(), &ShadeHints::default())),
            vec![
                (CategoryLabel::BRIGHT_AND_FUN, Some(DepthTier::D)),
                (CategoryLabel::RANDOM, Some(DepthTier::L)),
            ]
        );
    }

    #[test]
    fn test_daily_neutrals_placement() {
        // hsv(~26, ~45, ~65)
        let classifier = Classifier::default();
        let hsv = hsv_from_hex("#a67b5b").unwrap();
        assert_eq!(hsv.rounded_value(), 65);

        assert_eq!(
            labels(&classifier.classify(&hsv, &general(), &ShadeHints::default())),
            vec![
                (CategoryLabel::DAILY_NEUTRALS, Some(DepthTier::M)),
                (CategoryLabel::RANDOM, Some(DepthTier::M)),
            ]
        );
    }

    #[test]
    fn test_band_gap_drops_label_only() {
        // s ~ 50, v ~ 37: neutrals fires but 37 sits below its first band
        let classifier = Classifier::default();
        let hsv = hsv_from_hex("#5e4730").unwrap();
        assert_eq!(hsv.rounded_value(), 37);
        let placements = classifier.classify(&hsv, &general(), &ShadeHints::default());

        let neutrals = placements
            .iter()
            .find(|p| p.label.as_str() == CategoryLabel::DAILY_NEUTRALS)
            .unwrap();
        assert_eq!(neutrals.depth, None);
        assert!(matches!(
            neutrals.placed(),
            Err(CatalogError::UnclassifiableDepth { .. })
        ));

        let random = placements.last().unwrap();
        assert_eq!(random.depth, Some(DepthTier::D));
    }

    #[test]
    fn test_base_policy_uses_hint_only() {
        let classifier = Classifier::default();
        let hsv = hsv_from_hex("#ff0000").unwrap();
        let foundation = ProductCategory::parse("foundation").unwrap();
        let hints = ShadeHints {
            skintone: Some("VD"),
            ..ShadeHints::default()
        };

        let placements = classifier.classify(&hsv, &foundation, &hints);
        assert_eq!(labels(&placements), vec![("foundation", Some(DepthTier::D))]);
    }

    #[test]
    fn test_base_policy_unknown_hint() {
        let classifier = Classifier::default();
        let hsv = hsv_from_hex("#ff0000").unwrap();
        let concealer = ProductCategory::parse("concealer").unwrap();

        let placements = classifier.classify(&hsv, &concealer, &ShadeHints::default());
        assert_eq!(labels(&placements), vec![("concealer", None)]);

        let hints = ShadeHints {
            skintone: Some("XL"),
            ..ShadeHints::default()
        };
        let placements = classifier.classify(&hsv, &concealer, &hints);
        assert!(placements[0].placed().is_err());
    }

    #[test]
    fn test_contour_keys_on_finish() {
        let classifier = Classifier::default();
        let hsv = hsv_from_hex("#7a5230").unwrap();
        let hints = ShadeHints {
            skintone: Some("FM"),
            finish: Some("cream"),
            coverage: None,
        };

        let placements = classifier.classify(&hsv, &ProductCategory::Contour, &hints);
        assert_eq!(labels(&placements), vec![("cream", Some(DepthTier::L))]);

        let no_finish = ShadeHints {
            skintone: Some("D1"),
            ..ShadeHints::default()
        };
        let placements = classifier.classify(&hsv, &ProductCategory::Contour, &no_finish);
        assert_eq!(labels(&placements), vec![("any", Some(DepthTier::M))]);
    }

    #[test]
    fn test_custom_rule_table() {
        let rules = RuleSet {
            rules: vec![LabelRule {
                label: CategoryLabel::new("everything"),
                predicate: HsvPredicate::Always,
                bands: vec![DepthBand::new(0, 100, DepthTier::M)],
            }],
        };
        let classifier = Classifier::new(rules);
        let hsv = hsv_from_hex("#ffb6c1").unwrap();
        let placements = classifier.classify(&hsv, &general(), &ShadeHints::default());
        assert_eq!(labels(&placements), vec![("everything", Some(DepthTier::M))]);
    }
}
