//! Rounding helpers for kroner amounts

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round half-up (away from zero) to whole kroner
///
/// Saturates at the `i64` bounds.
pub fn avrund_til_heltall(belop: Decimal) -> i64 {
    let avrundet = belop.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    avrundet.to_i64().unwrap_or(if avrundet.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Sum of non-negative amounts, saturating at `Decimal::MAX`
///
/// Deductions have no upper bound, so a plain sum can overflow.
pub fn summer<I>(belop: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    belop
        .into_iter()
        .fold(Decimal::ZERO, |sum, b| sum.checked_add(b).unwrap_or(Decimal::MAX))
}

/// `belop * antall`, saturating at `Decimal::MAX`
pub fn multipliser(belop: Decimal, antall: usize) -> Decimal {
    belop.checked_mul(Decimal::from(antall as u64)).unwrap_or(Decimal::MAX)
}

/// Round half-up to øre
pub fn avrund_til_ore(belop: Decimal) -> Decimal {
    belop.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
