// src/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Fils precision used for every rounded figure.
pub const CURRENCY_SCALE: u32 = 3;

/// Round half-up (away from zero on the midpoint) to `scale` places.
pub fn round_to(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_currency(value: Decimal) -> Decimal {
    round_to(value, CURRENCY_SCALE)
}
