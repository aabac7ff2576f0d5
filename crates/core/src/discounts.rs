//! Discount utilities
//!
//! Coupon discounts are whole percentages applied to integer currency
//! amounts. Amounts never carry fractional units, so every discount is rounded
//! half-up to the nearest unit.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Convert whole percent points (`15` for 15%) into a fractional [`Percentage`].
pub fn percentage_from_points(points: u8) -> Percentage {
    Percentage::from(Decimal::from(points) / Decimal::ONE_HUNDRED)
}

/// Calculate `percent` of `amount`, rounded half-up to a whole unit.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows or
/// the result cannot be represented as a `u64`.
pub fn percent_of_amount(percent: &Percentage, amount: u64) -> Result<u64, DiscountError> {
    let amount = Decimal::from_u64(amount).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage crate doesn't actually expose the underlying Decimal
        .checked_mul(amount)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(DiscountError::PercentConversion)
}

/// Discount in whole units for `points` percent of `amount`.
///
/// # Errors
///
/// See [`percent_of_amount`].
pub fn discount_for_points(points: u8, amount: u64) -> Result<u64, DiscountError> {
    percent_of_amount(&percentage_from_points(points), amount)
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_amount_calculates_correctly() -> TestResult {
        let result = percent_of_amount(&Percentage::from(0.25), 200)?;

        assert_eq!(result, 50);

        Ok(())
    }

    #[test]
    fn midpoint_rounds_up() -> TestResult {
        // 15% of 1250 = 187.5
        assert_eq!(discount_for_points(15, 1250)?, 188);

        // 10% of 1005 = 100.5
        assert_eq!(discount_for_points(10, 1005)?, 101);

        // 10% of 1004 = 100.4
        assert_eq!(discount_for_points(10, 1004)?, 100);

        Ok(())
    }

    #[test]
    fn full_and_zero_discounts() -> TestResult {
        assert_eq!(discount_for_points(100, 4000)?, 4000);
        assert_eq!(discount_for_points(0, 4000)?, 0);
        assert_eq!(discount_for_points(50, 0)?, 0);

        Ok(())
    }

    #[test]
    fn checked_mul_overflow_returns_error() -> TestResult {
        let percent = Percentage::try_from("100000000000000000000")?;
        let result = percent_of_amount(&percent, u64::MAX);

        assert!(
            matches!(result, Err(DiscountError::PercentConversion)),
            "expected overflow, got {result:?}"
        );

        Ok(())
    }
}
