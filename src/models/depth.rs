//! Light / medium / dark depth tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Depth tier of a shade within a `(category, price tier)` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DepthTier {
    /// Light
    L,
    /// Medium
    M,
    /// Dark
    D,
}

impl DepthTier {
    /// All tiers in document order.
    pub const ALL: [Self; 3] = [Self::L, Self::M, Self::D];

    /// Donor tiers consulted, in order, when this tier is short during backfill.
    ///
    /// L borrows from M then D, M from L then D, D from M then L.
    #[must_use]
    pub const fn donors(self) -> [Self; 2] {
        match self {
            Self::L => [Self::M, Self::D],
            Self::M => [Self::L, Self::D],
            Self::D => [Self::M, Self::L],
        }
    }

    /// Single-letter key used in persisted documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::D => "D",
        }
    }
}

impl fmt::Display for DepthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepthTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "D" => Ok(Self::D),
            other => Err(format!("unknown depth tier '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donor_order() {
        assert_eq!(DepthTier::L.donors(), [DepthTier::M, DepthTier::D]);
        assert_eq!(DepthTier::M.donors(), [DepthTier::L, DepthTier::D]);
        assert_eq!(DepthTier::D.donors(), [DepthTier::M, DepthTier::L]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("M".parse::<DepthTier>().unwrap(), DepthTier::M);
        assert!("m".parse::<DepthTier>().is_err());
    }
}
