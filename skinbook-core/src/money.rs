//! Minor/major currency unit conversion.
//!
//! All arithmetic is decimal; prices never pass through floating point.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::ScrapeError;

/// Rate used when the exchange-rate endpoint cannot be reached (0.9).
pub const DEFAULT_USD_TO_EUR: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// Convert a minor-unit amount (cents) to a two-decimal major-unit string.
///
/// `1050` becomes `"10.50"`, `7` becomes `"0.07"`.
#[must_use]
pub fn cents_to_major(cents: u64) -> String {
    let major = Decimal::from_i128_with_scale(i128::from(cents), 2);
    format!("{major:.2}")
}

/// Convert an optional minor-unit price; `None` stays `None`.
#[must_use]
pub fn opt_cents_to_major(cents: Option<u64>) -> Option<String> {
    cents.map(cents_to_major)
}

/// Convert a marketplace USD price string (e.g. `"$1,234.56"`) to EUR at `rate`.
///
/// The result is rounded half away from zero to two decimals and suffixed with `€`.
///
/// # Errors
/// Returns [`ScrapeError::Data`] when the text is not a number once the dollar
/// sign and thousands separators are removed.
pub fn usd_to_eur_string(usd: &str, rate: Decimal) -> Result<String, ScrapeError> {
    let cleaned: String = usd
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let amount = Decimal::from_str(&cleaned)
        .map_err(|e| ScrapeError::Data(format!("invalid USD price {usd:?}: {e}")))?;
    let eur = (amount * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Ok(format!("{eur:.2}€"))
}
