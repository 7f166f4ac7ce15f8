//! Monetary amounts
//!
//! All amounts are `rust_decimal::Decimal` values carried with 2 fractional
//! digits. User input is rounded half away from zero before any validation.

use super::error::AtmError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Currency label shown next to amounts
pub const CURRENCY: &str = "PLN";

/// Number of fractional digits kept for every amount
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to 2 decimal places, half away from zero
///
/// The result always carries a scale of exactly 2, so `5` becomes `5.00`.
pub fn normalize_amount(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Parse an amount typed at the keypad
///
/// Accepts either `.` or `,` as the decimal separator and surrounding
/// whitespace. The parsed value is normalized to 2 decimal places.
///
/// # Errors
///
/// Returns `AtmError::InvalidFormat` if the input is not a decimal number.
pub fn parse_amount(input: &str) -> Result<Decimal, AtmError> {
    let cleaned = input.trim().replace(',', ".");
    Decimal::from_str(&cleaned)
        .map(normalize_amount)
        .map_err(|_| AtmError::invalid_format("amount", "a number such as 100 or 99.99"))
}

/// Render an amount with exactly 2 fractional digits
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
