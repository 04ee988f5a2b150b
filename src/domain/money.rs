//! Monetary types for price and rate representation.

use rust_decimal::Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Funding rate as a signed fraction (not a percentage).
///
/// Positive means long pays short; negative means short pays long.
pub type Rate = Decimal;

/// Convert a fraction to a percentage.
pub fn to_pct(fraction: Decimal) -> Decimal {
    fraction * Decimal::ONE_HUNDRED
}
