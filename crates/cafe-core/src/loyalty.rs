//! Loyalty point accrual.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::money::Money;

/// Points earned for a paid order: `floor(total / currency_per_point)`.
///
/// Zero or negative totals, and a non-positive unit, earn nothing.
///
/// ```rust
/// use cafe_core::{loyalty::points_for, Money};
/// use rust_decimal::Decimal;
///
/// assert_eq!(points_for(Money::from_major(15_000), Decimal::from(10)), 1_500);
/// assert_eq!(points_for(Money::from_major(9), Decimal::from(10)), 0);
/// ```
pub fn points_for(total: Money, currency_per_point: Decimal) -> i64 {
    if !total.is_positive() || currency_per_point <= Decimal::ZERO {
        return 0;
    }

    (total.amount() / currency_per_point)
        .floor()
        .to_i64()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn floors_fractional_points() {
        assert_eq!(points_for(Money::new(dec!(99.99)), dec!(10)), 9);
        assert_eq!(points_for(Money::from_major(40_000), dec!(10_000)), 4);
    }

    #[test]
    fn nothing_for_zero_total_or_bad_unit() {
        assert_eq!(points_for(Money::zero(), dec!(10)), 0);
        assert_eq!(points_for(Money::from_major(-5), dec!(10)), 0);
        assert_eq!(points_for(Money::from_major(100), dec!(0)), 0);
    }
}
