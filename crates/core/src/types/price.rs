//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are currency-agnostic amounts in the store's standard unit
//! (e.g. dollars, not cents). They are never negative: negative inputs are
//! clamped to zero, both when constructed and when deserialized.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative price.
///
/// ## Examples
///
/// ```
/// use cornershop_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(1999, 2));
/// assert_eq!(price.times(2).to_string(), "39.98");
/// assert_eq!(Price::new(Decimal::new(-5, 0)), Price::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, clamping negative amounts to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self::ZERO
        } else {
            Self(amount)
        }
    }

    /// Create a price from a floating point amount.
    ///
    /// The shortest decimal representation of the float is used, so `19.99`
    /// stays `19.99` rather than its binary expansion. Non-finite and negative
    /// values become zero.
    #[must_use]
    pub fn from_f64(amount: f64) -> Self {
        if !amount.is_finite() {
            return Self::ZERO;
        }
        amount
            .to_string()
            .parse::<Decimal>()
            .ok()
            .or_else(|| Decimal::from_f64_retain(amount))
            .map_or(Self::ZERO, Self::new)
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, saturating at the largest representable amount.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_amount_clamps_to_zero() {
        assert_eq!(Price::new(Decimal::new(-1, 2)), Price::ZERO);
        assert_eq!(Price::from_f64(-3.5), Price::ZERO);
        assert_eq!(Price::from_f64(f64::NAN), Price::ZERO);
    }

    #[test]
    fn test_from_f64_keeps_cents() {
        assert_eq!(Price::from_f64(19.99).to_string(), "19.99");
        assert_eq!(Price::from_f64(49.0).to_string(), "49.00");
    }

    #[test]
    fn test_sum_is_exact() {
        let total: Price = [
            Price::new(Decimal::new(1999, 2)).times(2),
            Price::new(Decimal::new(4900, 2)),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.amount(), Decimal::new(8898, 2));
    }

    #[test]
    fn test_deserialize_accepts_number_and_string() {
        let from_number: Price = serde_json::from_str("12.5").unwrap();
        let from_string: Price = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_deserialize_clamps_negative() {
        let price: Price = serde_json::from_str("\"-4\"").unwrap();
        assert_eq!(price, Price::ZERO);
    }
}
