//! RGB color handling with strict hex parsing and HSV conversion.

// Allow intentional type casts for color math
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CatalogError, CatalogResult};

/// RGB color value with hex string representation.
///
/// Represents a color using red, green, and blue channels (0-255 each).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

/// A color in hue / saturation / value space.
///
/// Hue is in degrees `[0, 360)`, saturation and value are percentages `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    /// Hue in degrees (0.0 for achromatic colors)
    pub hue: f64,
    /// Saturation percentage
    pub saturation: f64,
    /// Value (brightness) percentage
    pub value: f64,
}

impl Hsv {
    /// Value rounded to the nearest integer, as used for depth band lookups.
    #[must_use]
    pub fn rounded_value(&self) -> u8 {
        self.value.round().clamp(0.0, 100.0) as u8
    }
}

impl fmt::Display for Hsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsv({:.1}, {:.1}%, {:.1}%)",
            self.hue, self.saturation, self.value
        )
    }
}

impl RgbColor {
    /// Creates a new `RgbColor` from individual channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses an `RgbColor` from a strict hex string.
    ///
    /// Accepts exactly six hex digits with an optional leading `#`
    /// ("#RRGGBB", "rrggbb"). Shorthand (`#FFF`), alpha channels, and
    /// surrounding whitespace are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use shade_catalog::models::RgbColor;
    ///
    /// let color = RgbColor::from_hex("#FF0000").unwrap();
    /// assert_eq!(color, RgbColor::new(255, 0, 0));
    ///
    /// assert!(RgbColor::from_hex("#FFF").is_err());
    /// ```
    pub fn from_hex(input: &str) -> CatalogResult<Self> {
        let hex = strip_hash(input);

        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CatalogError::InvalidHex {
                input: input.to_string(),
            });
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| CatalogError::InvalidHex {
                input: input.to_string(),
            })
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Converts the color to a hex string in the format "#RRGGBB" (uppercase).
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Converts the RGB color to HSV with percentage saturation and value.
    ///
    /// Achromatic colors (max == min) get hue 0 and saturation 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use shade_catalog::models::RgbColor;
    ///
    /// let hsv = RgbColor::new(255, 0, 0).to_hsv();
    /// assert!((hsv.hue - 0.0).abs() < 0.01);
    /// assert!((hsv.saturation - 100.0).abs() < 0.01);
    /// assert!((hsv.value - 100.0).abs() < 0.01);
    /// ```
    #[must_use]
    #[allow(clippy::many_single_char_names)] // Standard RGB/HSV color model uses single-char names
    pub fn to_hsv(&self) -> Hsv {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let s = if max == 0.0 { 0.0 } else { delta / max };

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * (((g - b) / delta) % 6.0)
        } else if max == g {
            60.0 * (((b - r) / delta) + 2.0)
        } else {
            60.0 * (((r - g) / delta) + 4.0)
        };

        // Normalize hue to 0-360 range
        let h = if h < 0.0 { h + 360.0 } else { h };
        let h = if h >= 360.0 { h - 360.0 } else { h };

        Hsv {
            hue: h,
            saturation: s * 100.0,
            value: max * 100.0,
        }
    }
}

/// Converts a hex color string straight to HSV.
///
/// Callers must skip the record on error rather than substitute a default color.
pub fn hsv_from_hex(hex: &str) -> CatalogResult<Hsv> {
    RgbColor::from_hex(hex).map(|rgb| rgb.to_hsv())
}

/// Returns the hex digits without a single optional leading `#`.
#[must_use]
pub fn strip_hash(hex: &str) -> &str {
    hex.strip_prefix('#').unwrap_or(hex)
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
