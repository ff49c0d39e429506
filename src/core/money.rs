//! Monetary helpers
//!
//! All amounts in the core are [`rust_decimal::Decimal`]. Computed amounts
//! are rounded half-up to two decimal places; supplied totals are compared
//! against recomputed ones within [`TOLERANCE`].

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency scale: two decimal places.
pub const MONEY_SCALE: u32 = 2;

/// Divergence beyond this between a supplied and a recomputed amount is a
/// totals mismatch rather than rounding noise.
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Round a monetary amount to two decimal places, half-up.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * percent / 100`, rounded to money scale.
pub fn percentage_of(amount: Decimal, percent: Decimal) -> Decimal {
    round_money(amount * percent / Decimal::ONE_HUNDRED)
}

/// Whether two amounts agree within [`TOLERANCE`].
pub fn amounts_match(expected: Decimal, supplied: Decimal) -> bool {
    (expected - supplied).abs() <= TOLERANCE
}
