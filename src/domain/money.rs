//! Conversion between API decimals and the integer cents stored at rest.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Largest accepted magnitude: 999,999,999.99
pub const MAX_AMOUNT_CENTS: i64 = 99_999_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("amount cannot have more than 2 decimal places")]
    TooManyDecimals,

    #[error("amount cannot exceed 999,999,999.99 in magnitude")]
    OutOfRange,
}

/// Converts an amount to minor units. Trailing zeros beyond two places are
/// accepted (`1.500`), any non-zero third place is not.
pub fn decimal_to_cents(amount: Decimal) -> Result<i64, MoneyError> {
    if amount.normalize().scale() > 2 {
        return Err(MoneyError::TooManyDecimals);
    }

    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.to_i64())
        .ok_or(MoneyError::OutOfRange)?;

    if cents.abs() > MAX_AMOUNT_CENTS {
        return Err(MoneyError::OutOfRange);
    }

    Ok(cents)
}

#[must_use]
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_decimal_to_cents() {
        assert_eq!(decimal_to_cents(dec("42.50")), Ok(4250));
        assert_eq!(decimal_to_cents(dec("-42.5")), Ok(-4250));
        assert_eq!(decimal_to_cents(dec("200")), Ok(20000));
        assert_eq!(decimal_to_cents(dec("0.010")), Ok(1));
    }

    #[test]
    fn test_rejects_sub_cent_precision() {
        assert_eq!(
            decimal_to_cents(dec("0.001")),
            Err(MoneyError::TooManyDecimals)
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(decimal_to_cents(dec("999999999.99")), Ok(MAX_AMOUNT_CENTS));
        assert_eq!(
            decimal_to_cents(dec("1000000000.00")),
            Err(MoneyError::OutOfRange)
        );
        assert_eq!(
            decimal_to_cents(dec("-1000000000")),
            Err(MoneyError::OutOfRange)
        );
    }

    #[test]
    fn test_extreme_decimals_are_out_of_range() {
        assert_eq!(decimal_to_cents(Decimal::MAX), Err(MoneyError::OutOfRange));
        assert_eq!(decimal_to_cents(Decimal::MIN), Err(MoneyError::OutOfRange));
    }

    #[test]
    fn test_cents_to_decimal_keeps_two_places() {
        let value = cents_to_decimal(15750);
        assert_eq!(value.to_string(), "157.50");
        assert_eq!(cents_to_decimal(-5000).to_string(), "-50.00");
    }
}
