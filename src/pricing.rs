//! Price tier bucketing.

// Tier floors are small integral values
#![allow(clippy::cast_possible_truncation)]

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PRICE_CAP, DEFAULT_PRICE_STEP};

/// Step/cap settings for price tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBuckets {
    /// Width of one tier
    pub step: u32,
    /// Prices above this collapse into the cap tier
    pub cap: u32,
}

impl Default for PriceBuckets {
    fn default() -> Self {
        Self {
            step: DEFAULT_PRICE_STEP,
            cap: DEFAULT_PRICE_CAP,
        }
    }
}

impl PriceBuckets {
    /// Creates bucket settings; a zero step is treated as 1.
    #[must_use]
    pub const fn new(step: u32, cap: u32) -> Self {
        Self {
            step: if step == 0 { 1 } else { step },
            cap,
        }
    }

    /// Tier key for a price: `floor(price / step) * step`, or the cap when the
    /// price exceeds it. Missing, NaN, and negative prices count as 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use shade_catalog::pricing::PriceBuckets;
    ///
    /// let buckets = PriceBuckets::default();
    /// assert_eq!(buckets.tier(Some(1299.0)), "1000");
    /// assert_eq!(buckets.tier(Some(6000.0)), "5000");
    /// assert_eq!(buckets.tier(None), "0");
    /// ```
    #[must_use]
    pub fn tier(&self, price: Option<f64>) -> String {
        let price = price.filter(|p| !p.is_nan()).unwrap_or(0.0);
        let step = f64::from(self.step.max(1));

        if price > f64::from(self.cap) {
            return self.cap.to_string();
        }

        let floor = (price / step).floor() * step;
        // Negative prices are treated like a missing price
        if floor <= 0.0 {
            return "0".to_string();
        }
        (floor as i64).to_string()
    }
}

/// Tier key with the default step (500) and cap (5000).
#[must_use]
pub fn price_tier(price: Option<f64>) -> String {
    PriceBuckets::default().tier(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        assert_eq!(price_tier(Some(1299.0)), "1000");
        assert_eq!(price_tier(Some(6000.0)), "5000");
        assert_eq!(price_tier(None), "0");
        assert_eq!(price_tier(Some(0.0)), "0");
        assert_eq!(price_tier(Some(499.99)), "0");
        assert_eq!(price_tier(Some(500.0)), "500");
        assert_eq!(price_tier(Some(1200.0)), "1000");
    }

    #[test]
    fn test_cap_boundary() {
        // Exactly the cap is not above it
        assert_eq!(price_tier(Some(5000.0)), "5000");
        assert_eq!(price_tier(Some(4999.0)), "4500");
        assert_eq!(price_tier(Some(5000.01)), "5000");
        assert_eq!(price_tier(Some(1_000_000.0)), "5000");
    }

    #[test]
    fn test_non_finite_and_negative() {
        assert_eq!(price_tier(Some(f64::NAN)), "0");
        assert_eq!(price_tier(Some(f64::INFINITY)), "5000");
        assert_eq!(price_tier(Some(f64::NEG_INFINITY)), "0");
        assert_eq!(price_tier(Some(-250.0)), "0");
    }

    #[test]
    fn test_custom_step_and_cap() {
        let buckets = PriceBuckets::new(250, 1000);
        assert_eq!(buckets.tier(Some(260.0)), "250");
        assert_eq!(buckets.tier(Some(1001.0)), "1000");

        let zero_step = PriceBuckets::new(0, 100);
        assert_eq!(zero_step.tier(Some(42.5)), "42");
    }
}
