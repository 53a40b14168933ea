//! # Money Module
//!
//! Provides the `Money` type for prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prices are stored as integer minor units (two fractional digits).      │
//! │                                                                         │
//! │    "149,000"   ──► parse ──► Money(14_900_000) ──► "149000.00" (CSV)   │
//! │    "₩1,000"    ──► parse ──► Money(100_000)    ──► "₩1,000"    (UI)    │
//! │                                                                         │
//! │  Parsing goes through rust_decimal, never through f64, so "0.1 + 0.2"  │
//! │  style drift cannot leak into inventory values.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shoebox_core::money::Money;
//!
//! let price = Money::parse("₩1,000").unwrap();
//! assert_eq!(price.cents(), 100_000);
//! assert_eq!(price.to_string(), "1000.00");
//! assert_eq!(price.format_won(), "₩1,000");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Characters stripped from price text before parsing.
///
/// Covers thousands separators, currency symbols and whitespace as they
/// appear in hand-maintained spreadsheets.
const PRICE_NOISE: &[char] = &[',', '₩', '원', '$'];

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units (1/100 of the currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: validation rejects negative prices, but sums and
///   differences stay representable
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use shoebox_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Creates a Money value from whole currency units (e.g. won).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Converts a decimal amount, rounding half away from zero to two
    /// fractional digits.
    ///
    /// Returns `None` when the amount does not fit in i64 minor units.
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()
            .map(Money)
    }

    /// Returns the exact decimal amount.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Parses human-entered price text.
    ///
    /// Thousands separators, `₩`, `원`, `$` and whitespace are ignored.
    ///
    /// ```rust
    /// use shoebox_core::money::Money;
    ///
    /// assert_eq!(Money::parse("1,000").unwrap(), Money::from_units(1000));
    /// assert_eq!(Money::parse(" 89000원 ").unwrap(), Money::from_units(89000));
    /// assert!(Money::parse("abc").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && !PRICE_NOISE.contains(c))
            .collect();

        if cleaned.is_empty() {
            return Err(ValidationError::required("price"));
        }

        let amount = Decimal::from_str(&cleaned)
            .map_err(|e| ValidationError::invalid_format("price", format!("'{}': {}", text, e)))?;

        Money::from_decimal(amount)
            .ok_or_else(|| ValidationError::invalid_format("price", format!("'{}' is too large", text)))
    }

    /// Formats for display as whole won with thousands separators.
    ///
    /// ```rust
    /// use shoebox_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(1_234_567).format_won(), "₩1,234,567");
    /// assert_eq!(Money::from_cents(50).format_won(), "₩1");
    /// ```
    pub fn format_won(&self) -> String {
        let units = (self.0.unsigned_abs() + 50) / 100;
        let sign = if self.0 < 0 && units > 0 { "-" } else { "" };
        format!("{}₩{}", sign, group_thousands(units))
    }
}

/// Inserts `,` every three digits.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal form with two fractional digits (`1000.00`).
///
/// This is the format used in CSV exports and accepted back by import.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Money(cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_currency_noise() {
        assert_eq!(Money::parse("₩1,000").unwrap().cents(), 100_000);
        assert_eq!(Money::parse("$12.5").unwrap().cents(), 1250);
        assert_eq!(Money::parse("149,000원").unwrap(), Money::from_units(149_000));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Money::parse("abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            Money::parse(" ₩ "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_parse_rounds_to_two_places() {
        assert_eq!(Money::parse("10.005").unwrap().cents(), 1001);
        assert_eq!(Money::parse("10.004").unwrap().cents(), 1000);
    }

    #[test]
    fn test_parse_keeps_sign() {
        assert!(Money::parse("-500").unwrap().is_negative());
    }

    #[test]
    fn test_display_is_plain_decimal() {
        assert_eq!(Money::from_cents(100_000).to_string(), "1000.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_display_parses_back() {
        let price = Money::from_cents(8_950_050);
        assert_eq!(Money::parse(&price.to_string()).unwrap(), price);
    }

    #[test]
    fn test_format_won() {
        assert_eq!(Money::zero().format_won(), "₩0");
        assert_eq!(Money::from_units(999).format_won(), "₩999");
        assert_eq!(Money::from_units(1000).format_won(), "₩1,000");
        assert_eq!(Money::from_units(-25_000).format_won(), "-₩25,000");
    }

    #[test]
    fn test_decimal_conversion() {
        let price = Money::from_major_minor(120, 50);
        assert_eq!(price.to_decimal(), Decimal::new(12050, 2));
        assert_eq!(Money::from_decimal(price.to_decimal()), Some(price));
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 1000);
    }
}
