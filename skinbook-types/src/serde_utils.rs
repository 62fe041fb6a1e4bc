//! Lenient deserializers for marketplace payloads.
//!
//! The marketplace reports order counts either as JSON numbers or as strings
//! with thousands separators (`"12,345"`), and prices as numeric strings or
//! `null`. Older snapshot files stored whatever the marketplace returned, so
//! persisted records go through the same helpers.

use serde::de::{self, Deserializer, Unexpected, Visitor};
use std::fmt;

struct LenientU64;

impl<'de> Visitor<'de> for LenientU64 {
    type Value = Option<u64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer, a numeric string or null")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = v as u64;
            Ok(Some(whole))
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let cleaned: String = v.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
        if cleaned.is_empty() {
            return Ok(None);
        }
        cleaned
            .parse::<u64>()
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(Self)
    }
}

/// Deserialize an optional count or minor-unit price.
///
/// `null`, a missing field (with `#[serde(default)]`) and `""` all map to `None`.
///
/// # Errors
/// Fails on negative numbers, fractional numbers and non-numeric strings.
pub fn opt_u64<'de, D>(d: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_option(LenientU64)
}

/// Deserialize a count, treating `null` and `""` as zero.
///
/// # Errors
/// Fails on negative numbers, fractional numbers and non-numeric strings.
pub fn u64_or_zero<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    opt_u64(d).map(Option::unwrap_or_default)
}
