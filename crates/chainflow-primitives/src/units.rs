//! Decimal amount conversion.
//!
//! User-facing amounts arrive as decimal strings ("1.5") and are converted to
//! integer base units using the asset's declared decimal count. Floating point
//! is never involved in either direction.

use primitive_types::U256;
use thiserror::Error;

use crate::NATIVE_DECIMALS;

/// Amount conversion error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    /// Empty input
    #[error("empty amount")]
    Empty,
    /// Input is not a plain non-negative decimal number
    #[error("invalid decimal amount: {0}")]
    InvalidNumber(String),
    /// More fractional digits than the asset supports
    #[error("too many decimal places in {value} (asset supports {decimals})")]
    TooPrecise {
        /// Offending input
        value: String,
        /// Asset decimals
        decimals: u8,
    },
    /// Value does not fit in 256 bits
    #[error("amount overflows 256 bits: {0}")]
    Overflow(String),
}

/// Parse a decimal string into base units with `decimals` fractional digits
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, UnitsError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitsError::InvalidNumber(value.to_string()));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(UnitsError::InvalidNumber(value.to_string()));
    }

    // trailing zeros never change the value
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            value: value.to_string(),
            decimals,
        });
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    for _ in fraction.len()..decimals as usize {
        digits.push('0');
    }
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }

    U256::from_dec_str(digits).map_err(|_| UnitsError::Overflow(value.to_string()))
}

/// Parse a native-currency amount (18 decimals)
pub fn parse_ether(value: &str) -> Result<U256, UnitsError> {
    parse_units(value, NATIVE_DECIMALS)
}

/// Format base units as a decimal string with `decimals` fractional digits.
///
/// Trailing fractional zeros are trimmed but at least one fractional digit is
/// kept, so whole amounts render as `"1.0"`.
pub fn format_units(value: U256, decimals: u8) -> String {
    let raw = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return raw;
    }

    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - raw.len() + 1), raw)
    } else {
        raw
    };
    let split = padded.len() - decimals;
    let (whole, fraction) = padded.split_at(split);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Format a native-currency amount (18 decimals)
pub fn format_ether(value: U256) -> String {
    format_units(value, NATIVE_DECIMALS)
}
