//! A decimal money type that is stored as whole cents and rendered as a JSON number.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Serialize, Serializer};

/// The number of decimal places kept for money and percentages.
pub const DECIMAL_PLACES: u32 = 2;

/// Round `value` half away from zero to two decimal places.
pub fn round_2dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// An amount of money with exactly two decimal places.
///
/// In the database the amount is stored as an integer number of cents so that
/// `SUM` stays exact. In JSON it is written as a number, e.g. `150.0`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create an amount from `value`, rounding to two decimal places.
    pub fn new(value: Decimal) -> Self {
        Self(round_2dp(value))
    }

    /// Create an amount from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, DECIMAL_PLACES))
    }

    /// The amount as a whole number of cents, or `None` if it does not fit in an `i64`.
    pub fn cents(&self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED).trunc().to_i64()
    }

    /// The amount as a decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Divide the amount into `count` equal parts, rounding to two decimal places.
    ///
    /// Returns zero when `count` is zero.
    pub fn average(&self, count: u32) -> Money {
        if count == 0 {
            return Money::ZERO;
        }

        Money::new(self.0 / Decimal::from(count))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |total, amount| total + amount)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let cents = self
            .cents()
            .ok_or_else(|| rusqlite::Error::ToSqlConversionFailure("amount too large".into()))?;

        Ok(ToSqlOutput::from(cents))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(cents) => Ok(Money::from_cents(cents)),
            ValueRef::Null => Ok(Money::ZERO),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::money::{Money, round_2dp};

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_2dp(dec!(1.005)), dec!(1.01));
        assert_eq!(round_2dp(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_2dp(dec!(76.923076)), dec!(76.92));
    }

    #[test]
    fn new_rounds_to_cents() {
        assert_eq!(Money::new(dec!(12.345)).cents(), Some(1235));
    }

    #[test]
    fn average_of_zero_items_is_zero() {
        assert_eq!(Money::from_cents(1000).average(0), Money::ZERO);
    }

    #[test]
    fn average_rounds_to_cents() {
        assert_eq!(Money::from_cents(10000).average(3), Money::new(dec!(33.33)));
    }

    #[test]
    fn serializes_as_json_number() {
        let json = serde_json::to_string(&Money::from_cents(7692)).unwrap();

        assert_eq!(json, "76.92");
    }

    #[test]
    fn sums_exactly() {
        let total: Money = [Money::new(dec!(0.1)), Money::new(dec!(0.2))]
            .into_iter()
            .sum();

        assert_eq!(total, Money::new(dec!(0.3)));
    }
}
