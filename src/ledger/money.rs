//! Fixed-point amounts stored as signed cents.

use std::fmt;
use std::ops::Neg;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CENTS_PER_UNIT: i64 = 100;

static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<sign>[+-])?(?P<units>[0-9]+)(?:\.(?P<fraction>[0-9]{1,2}))?$")
        .expect("amount pattern compiles")
});

/// A signed amount in cents. One cent is the accounting unit used for rounding.
///
/// The range is symmetric, `-i64::MAX..=i64::MAX`, so negation and `abs` never
/// overflow. Addition and subtraction are only offered in checked or
/// saturating form.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a valid amount")]
pub struct MoneyParseError(pub String);

impl Money {
    pub const MAX: Money = Money(i64::MAX);
    pub const MIN: Money = Money(-i64::MAX);

    /// `i64::MIN` is clamped to [`Money::MIN`].
    pub const fn from_cents(cents: i64) -> Self {
        if cents == i64::MIN {
            Self::MIN
        } else {
            Self(cents)
        }
    }

    /// Whole currency units, e.g. `Money::from_units(-50)` is `-50.00`.
    pub const fn from_units(units: i64) -> Self {
        Self(units * CENTS_PER_UNIT)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Parses an optionally signed integer or a decimal with at most two
    /// fractional digits. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, MoneyParseError> {
        let trimmed = raw.trim();
        let invalid = || MoneyParseError(trimmed.to_string());
        let captures = AMOUNT_PATTERN.captures(trimmed).ok_or_else(invalid)?;

        let units: i64 = captures["units"].parse().map_err(|_| invalid())?;
        let fraction = match captures.name("fraction") {
            Some(digits) if digits.as_str().len() == 1 => {
                digits.as_str().parse::<i64>().map_err(|_| invalid())? * 10
            }
            Some(digits) => digits.as_str().parse::<i64>().map_err(|_| invalid())?,
            None => 0,
        };

        let cents = units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|value| value.checked_add(fraction))
            .ok_or_else(invalid)?;

        match captures.name("sign").map(|sign| sign.as_str()) {
            Some("-") => Ok(Self(-cents)),
            _ => Ok(Self(cents)),
        }
    }

    /// `self * numerator / denominator`, rounded half away from zero to the cent.
    ///
    /// Returns `None` when `denominator` is zero or the result overflows.
    pub fn scale(&self, numerator: Money, denominator: Money) -> Option<Money> {
        if denominator.is_zero() {
            return None;
        }
        let product = i128::from(self.0) * i128::from(numerator.0);
        let denominator = i128::from(denominator.0);
        let quotient = product / denominator;
        let remainder = product % denominator;
        let rounded = if 2 * remainder.abs() >= denominator.abs() {
            if (product < 0) != (denominator < 0) {
                quotient - 1
            } else {
                quotient + 1
            }
        } else {
            quotient
        };
        i64::try_from(rounded).ok().and_then(Self::in_range)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).and_then(Self::in_range)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).and_then(Self::in_range)
    }

    pub fn saturating_add(self, other: Money) -> Money {
        self.checked_add(other).unwrap_or(if other.is_negative() {
            Self::MIN
        } else {
            Self::MAX
        })
    }

    /// Sum of `values`, or `None` as soon as a partial sum leaves the range.
    pub fn checked_sum<I>(values: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        values
            .into_iter()
            .try_fold(Money::zero(), |acc, value| acc.checked_add(value))
    }

    fn in_range(cents: i64) -> Option<Money> {
        (cents != i64::MIN).then_some(Money(cents))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            magnitude / CENTS_PER_UNIT as u64,
            magnitude % CENTS_PER_UNIT as u64
        )
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_and_decimal_forms() {
        assert_eq!(Money::parse("100"), Ok(Money::from_units(100)));
        assert_eq!(Money::parse("-50"), Ok(Money::from_units(-50)));
        assert_eq!(Money::parse("+7"), Ok(Money::from_units(7)));
        assert_eq!(Money::parse("12.5"), Ok(Money::from_cents(1250)));
        assert_eq!(Money::parse("-0.07"), Ok(Money::from_cents(-7)));
        assert_eq!(Money::parse(" 3.10 "), Ok(Money::from_cents(310)));
    }

    #[test]
    fn rejects_non_numeric_forms() {
        for raw in ["", "abc", "12.345", "1e3", "1,000", "--5", "5.", ".5", "$5"] {
            assert!(Money::parse(raw).is_err(), "`{raw}` should not parse");
        }
    }

    #[test]
    fn rejects_overflowing_amounts() {
        assert!(Money::parse("99999999999999999999").is_err());
        assert!(Money::parse("92233720368547759").is_err());
    }

    #[test]
    fn largest_parsed_amounts_stay_in_range() {
        let top = Money::parse("92233720368547758.07").expect("i64::MAX cents");
        assert_eq!(top, Money::MAX);
        assert_eq!(Money::parse("-92233720368547758.07"), Ok(Money::MIN));
        assert_eq!(-Money::MIN, Money::MAX);
        assert_eq!(Money::MIN.abs(), Money::MAX);
        assert!(Money::parse("-92233720368547758.08").is_err());
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let big = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(big.checked_add(big), None);
        assert_eq!((-big).checked_sub(big), None);
        assert_eq!(Money::MIN.checked_sub(Money::from_cents(1)), None);
        assert_eq!(Money::MAX.checked_add(Money::MIN), Some(Money::zero()));
        assert_eq!(Money::from_cents(i64::MIN), Money::MIN);
        assert_eq!(Money::MAX.saturating_add(Money::from_cents(1)), Money::MAX);
        assert_eq!(Money::MIN.saturating_add(Money::from_cents(-1)), Money::MIN);
    }

    #[test]
    fn checked_sum_stops_at_overflow() {
        let values = [Money::from_units(3), Money::from_cents(-50), Money::from_cents(5)];
        assert_eq!(Money::checked_sum(values), Some(Money::from_cents(255)));
        assert_eq!(Money::checked_sum([Money::MAX, Money::from_cents(1)]), None);
        assert_eq!(Money::checked_sum(Vec::<Money>::new()), Some(Money::zero()));
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn scale_rounds_half_away_from_zero() {
        let target = Money::from_cents(100);
        assert_eq!(
            target.scale(Money::from_cents(1), Money::from_cents(3)),
            Some(Money::from_cents(33))
        );
        assert_eq!(
            target.scale(Money::from_cents(1), Money::from_cents(8)),
            Some(Money::from_cents(13))
        );
        assert_eq!(
            (-target).scale(Money::from_cents(1), Money::from_cents(8)),
            Some(Money::from_cents(-13))
        );
        assert_eq!(target.scale(Money::from_cents(1), Money::zero()), None);
    }
}
