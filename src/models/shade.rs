//! Raw shade records and the entries stored inside a taxonomy.

// Integral prices are written back as JSON integers
#![allow(clippy::cast_possible_truncation)]

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::DepthTier;
use crate::errors::{CatalogError, CatalogResult};

/// Skin-depth hint captured for base and contour products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinDepth {
    /// Fair
    F,
    /// Fair-medium
    FM,
    /// Medium
    MD,
    /// Deep 1
    D1,
    /// Deep 2
    D2,
    /// Very deep
    VD,
}

impl SkinDepth {
    /// Every hint, lightest first.
    pub const ALL: [Self; 6] = [Self::F, Self::FM, Self::MD, Self::D1, Self::D2, Self::VD];

    /// Parses an exact hint code; anything else yields `None`.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "F" => Some(Self::F),
            "FM" => Some(Self::FM),
            "MD" => Some(Self::MD),
            "D1" => Some(Self::D1),
            "D2" => Some(Self::D2),
            "VD" => Some(Self::VD),
            _ => None,
        }
    }

    /// Hint code as written in source documents.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::F => "F",
            Self::FM => "FM",
            Self::MD => "MD",
            Self::D1 => "D1",
            Self::D2 => "D2",
            Self::VD => "VD",
        }
    }

    /// Fixed mapping `{F,FM} → L`, `{MD,D1} → M`, `{D2,VD} → D`.
    #[must_use]
    pub const fn depth_tier(self) -> DepthTier {
        match self {
            Self::F | Self::FM => DepthTier::L,
            Self::MD | Self::D1 => DepthTier::M,
            Self::D2 | Self::VD => DepthTier::D,
        }
    }
}

/// A shade as supplied by the data-entry collaborator.
///
/// Field names follow the flat input documents (`shade_hex_code`, `type`, ...).
/// Values are read leniently: `null` strings become empty, prices may be
/// numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShadeRecord {
    /// Brand name
    #[serde(default, deserialize_with = "lenient_string")]
    pub brand: String,
    /// Product name
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: String,
    /// Shade name
    #[serde(default, deserialize_with = "lenient_string")]
    pub shade_name: String,
    /// Hex color, validated only at classification time
    #[serde(default, deserialize_with = "lenient_string")]
    pub shade_hex_code: String,
    /// Price; missing or non-numeric values are `None`
    #[serde(
        default,
        deserialize_with = "lenient_price",
        serialize_with = "serialize_price"
    )]
    pub price: Option<f64>,
    /// Product page link
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: String,
    /// Requested product category
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub category: String,
    /// Coverage attribute (base products)
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub coverage: Option<String>,
    /// Finish attribute (contour products)
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub finish: Option<String>,
    /// Skin-depth hint code
    #[serde(default, deserialize_with = "lenient_tone")]
    pub skintone: Option<String>,
}

impl ShadeRecord {
    /// Identity of this shade for deduplication.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(&self.brand, &self.product_name, &self.shade_name)
    }

    /// Parses a JSON array of records one element at a time.
    ///
    /// Elements that cannot be read as a record are counted and skipped so a
    /// single malformed shade never aborts the batch.
    pub fn parse_batch(value: &Value) -> CatalogResult<(Vec<Self>, usize)> {
        let items = value.as_array().ok_or_else(|| {
            CatalogError::Configuration("shade records must be a JSON array".to_string())
        })?;

        let mut records = Vec::with_capacity(items.len());
        let mut rejected = 0;
        for item in items {
            match Self::deserialize(item) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("skipping unreadable shade record: {e}");
                    rejected += 1;
                }
            }
        }

        Ok((records, rejected))
    }
}

/// `(brand, product, shade)` identity; exact, case- and whitespace-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    /// Brand name
    pub brand: String,
    /// Product name
    pub product_name: String,
    /// Shade name
    pub shade_name: String,
}

impl DedupKey {
    /// Builds a key from its three parts.
    pub fn new(brand: &str, product_name: &str, shade_name: &str) -> Self {
        Self {
            brand: brand.to_string(),
            product_name: product_name.to_string(),
            shade_name: shade_name.to_string(),
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:::{}:::{}", self.brand, self.product_name, self.shade_name)
    }
}

/// Stored attributes of a shade inside a taxonomy list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShadeDetails {
    /// Brand name
    #[serde(default, deserialize_with = "lenient_string")]
    pub brand: String,
    /// Product name
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: String,
    /// Shade name
    #[serde(default, deserialize_with = "lenient_string")]
    pub shade_name: String,
    /// Hex color with leading `#`
    #[serde(default, deserialize_with = "lenient_string")]
    pub shade_hex_code: String,
    /// Price as ingested
    #[serde(
        default,
        deserialize_with = "lenient_price",
        serialize_with = "serialize_price"
    )]
    pub price: Option<f64>,
    /// Product page link
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: String,
    /// Product category the shade was built for
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub category: String,
}

/// One taxonomy list element: `{"#hex": {brand, product_name, ...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadeEntry {
    /// Hex color prefixed with `#`; the single key of the JSON object
    pub hex_key: String,
    /// Stored attributes
    pub details: ShadeDetails,
}

impl ShadeEntry {
    /// Builds an entry from a record whose hex has already been validated.
    #[must_use]
    pub fn from_record(record: &ShadeRecord, hex_digits: &str, category: &str) -> Self {
        let hex_key = format!("#{hex_digits}");
        Self {
            details: ShadeDetails {
                brand: record.brand.clone(),
                product_name: record.product_name.clone(),
                shade_name: record.shade_name.clone(),
                shade_hex_code: hex_key.clone(),
                price: record.price,
                link: record.link.clone(),
                category: category.to_string(),
            },
            hex_key,
        }
    }

    /// Identity of this entry for deduplication.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(
            &self.details.brand,
            &self.details.product_name,
            &self.details.shade_name,
        )
    }
}

impl Serialize for ShadeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.hex_key, &self.details)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ShadeEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = IndexMap::<String, ShadeDetails>::deserialize(deserializer)?;
        let (hex_key, details) = map
            .into_iter()
            .next()
            .ok_or_else(|| de::Error::custom("shade entry must have exactly one hex key"))?;
        Ok(Self { hex_key, details })
    }
}

// ============================================================================
// Lenient field readers
// ============================================================================

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => return Err(de::Error::custom(format!("expected a string, got {other}"))),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let s = lenient_string(deserializer)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

/// Reads a skin tone that may be a code string or a `{code: bool}` object.
fn lenient_tone<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let tone = normalize_tone(&value);
    Ok(if tone.is_empty() { None } else { Some(tone) })
}

/// Flattens a tone value to a string; objects become a comma-joined list of
/// their truthy keys (all keys when none are truthy).
#[must_use]
pub fn normalize_tone(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let truthy: Vec<&str> = map
                .iter()
                .filter(|(_, v)| is_truthy(v))
                .map(|(k, _)| k.as_str())
                .collect();
            if truthy.is_empty() {
                map.keys().map(String::as_str).collect::<Vec<_>>().join(",")
            } else {
                truthy.join(",")
            }
        }
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads a price from a number or numeric string; anything else is `None`.
#[must_use]
pub fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|p| p.is_finite()),
        _ => None,
    }
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(parse_price(&Value::deserialize(deserializer)?))
}

#[allow(clippy::ref_option)] // serde's serialize_with signature
fn serialize_price<S: Serializer>(price: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match price {
        Some(p) if p.fract() == 0.0 && p.abs() < 9_007_199_254_740_992.0 => {
            serializer.serialize_i64(*p as i64)
        }
        Some(p) => serializer.serialize_f64(*p),
        None => serializer.serialize_none(),
    }
}
