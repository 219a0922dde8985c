//! Rounding rules shared by the income tax and withholding calculations.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to whole dollars, sending exact midpoints to the even neighbour.
///
/// Withholding amounts are rounded this way, so `0.5` becomes `0` and
/// `1.5` becomes `2`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_even;
///
/// assert_eq!(round_half_even(dec!(406.93175)), dec!(407));
/// assert_eq!(round_half_even(dec!(2.5)), dec!(2));
/// assert_eq!(round_half_even(dec!(3.5)), dec!(4));
/// ```
pub fn round_half_even(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// Drops the cents from `value` and adds 99 cents.
///
/// This is how weekly earnings are expressed before a Schedule 1 formula
/// is applied.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::ignore_cents_add_99;
///
/// assert_eq!(ignore_cents_add_99(dec!(1471.8076)), dec!(1471.99));
/// assert_eq!(ignore_cents_add_99(dec!(500)), dec!(500.99));
/// ```
pub fn ignore_cents_add_99(value: Decimal) -> Decimal {
    value.trunc() + Decimal::new(99, 2)
}

/// Whether the cents component of `value`, ignoring anything past the
/// second decimal place, is exactly 33.
pub fn cents_are_33(value: Decimal) -> bool {
    let truncated_to_cents = (value * Decimal::ONE_HUNDRED).trunc() / Decimal::ONE_HUNDRED;
    truncated_to_cents - value.trunc() == Decimal::new(33, 2)
}
