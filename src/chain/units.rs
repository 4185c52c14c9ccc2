//! Decimal conversions between human amounts and token base units

use crate::{Error, Result};
use alloy::primitives::U256;
use serde::Serializer;

/// Format a base-unit amount, trimming trailing fractional zeros
pub fn format_units(value: U256, decimals: u8) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }
    let remainder_str = format!("{:0>width$}", remainder, width = decimals as usize);
    format!("{}.{}", whole, remainder_str.trim_end_matches('0'))
}

/// Format with exactly `decimals` fractional digits ("1.500000" for 6)
pub fn format_units_fixed(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;
    format!(
        "{}.{:0>width$}",
        whole,
        remainder,
        width = decimals as usize
    )
}

/// Parse a non-negative decimal string into base units
///
/// More fractional digits than the token supports is an error rather than a
/// silent truncation.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(Error::invalid(format!("Invalid amount: '{}'", amount)));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(Error::invalid(format!("Invalid amount: '{}'", amount)));
    }
    if fraction.len() > decimals as usize {
        return Err(Error::invalid(format!(
            "Amount '{}' has more than {} decimal places",
            amount, decimals
        )));
    }

    let digits = format!(
        "{}{:0<width$}",
        whole,
        fraction,
        width = decimals as usize
    );
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10)
        .map_err(|e| Error::invalid(format!("Amount '{}' out of range: {}", amount, e)))
}

/// Serialize a `U256` as a plain decimal string
pub fn serialize_decimal<S: Serializer>(value: &U256, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
