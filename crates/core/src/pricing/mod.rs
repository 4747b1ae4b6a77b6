pub mod catalog;
pub mod channel;
pub mod stacking;
pub mod validator;

use rust_decimal::{Decimal, RoundingStrategy};

pub const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Combined enabled percent above which a stack is rejected.
pub const MAX_TOTAL_DISCOUNT_PCT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Clamps a percent into `[0, 100]`.
pub fn clamp_percent(percent: Decimal) -> Decimal {
    percent.clamp(Decimal::ZERO, ONE_HUNDRED)
}

/// Clamped percent expressed as a fraction of one.
pub fn fraction(percent: Decimal) -> Decimal {
    clamp_percent(percent) / ONE_HUNDRED
}

/// Rounds to the nearest whole unit, halves away from zero.
pub fn round_to_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `(base - price) / base` as a percent, or zero when there is no base to compare against.
pub(crate) fn discount_vs_base(base: Decimal, price: Decimal) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    (base - price) / base * ONE_HUNDRED
}
