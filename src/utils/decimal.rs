//! Decimal helpers for ratio and percentage calculations.
//!
//! Every division here is guarded: a zero denominator yields zero rather
//! than an error, which the scoring rules read as "no signal".

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Safe division that returns zero if divisor is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator == Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Percentage change from `from` to `to` (e.g. 100 -> 105 = 5).
pub fn percent_change(from: Decimal, to: Decimal) -> Decimal {
    safe_div(to - from, from) * dec!(100)
}

/// Absolute relative distance between `value` and `reference` (0.03 = 3%).
pub fn relative_distance(value: Decimal, reference: Decimal) -> Decimal {
    safe_div((value - reference).abs(), reference)
}

/// Round to two decimal places for display.
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp(2)
}
