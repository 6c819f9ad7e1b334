//! Type-safe price representation using decimal arithmetic.
//!
//! The store keeps prices as plain decimals in rupees (no minor units), e.g.
//! `349` or `1299.5`. They are summed into cart totals and revenue figures,
//! so floating point is kept out of the arithmetic entirely.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`] from operator input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("price must be a number, got {0:?}")]
    NotANumber(String),
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A price in rupees.
///
/// Serialized as a decimal string so no precision is lost; deserialized from
/// either a JSON number or a numeric string, since both show up in stored
/// rows.
///
/// Arithmetic saturates instead of overflowing: stored rows are taken as-is
/// and a nonsensical amount must not take down a total.
///
/// ## Examples
///
/// ```
/// use circuit_cart_core::Price;
///
/// let price = Price::parse("100").unwrap();
/// assert_eq!(price.times(2).to_string(), "₹200");
///
/// assert!(Price::parse("-5").is_err());
/// assert!(Price::parse("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: u32) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Parse operator input such as `"349"` or `"1299.50"`.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a decimal number, or
    /// negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount: Decimal = trimmed
            .parse()
            .map_err(|_| PriceError::NotANumber(trimmed.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line subtotal for `qty` units at this price, saturating on overflow.
    #[must_use]
    pub fn times(self, qty: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(qty)))
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at the largest representable amount.
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// Raw shapes a stored price can take on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(serde_json::Number),
    Text(String),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RawPrice::deserialize(deserializer)? {
            RawPrice::Number(n) => n.to_string(),
            RawPrice::Text(s) => s,
        };
        // Stored rows are taken as-is; the sign check only guards operator input.
        text.trim()
            .parse::<Decimal>()
            .map(Self)
            .map_err(|_| serde::de::Error::custom(format!("invalid price: {text:?}")))
    }
}

impl std::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_prices() {
        assert_eq!(Price::parse("100").unwrap(), Price::from_rupees(100));
        assert_eq!(Price::parse(" 0 ").unwrap(), Price::ZERO);
        assert_eq!(
            Price::parse("1299.50").unwrap().amount(),
            Decimal::new(129_950, 2)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Price::parse(""), Err(PriceError::Empty));
        assert_eq!(Price::parse("   "), Err(PriceError::Empty));
        assert!(matches!(Price::parse("NaN"), Err(PriceError::NotANumber(_))));
        assert!(matches!(Price::parse("12abc"), Err(PriceError::NotANumber(_))));
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
    }

    #[test]
    fn test_times_and_sum() {
        let lines = [Price::from_rupees(100).times(2), Price::from_rupees(50).times(1)];
        let total: Price = lines.into_iter().sum();
        assert_eq!(total, Price::from_rupees(250));
    }

    #[test]
    fn test_display_drops_trailing_zeros() {
        assert_eq!(Price::parse("200.00").unwrap().to_string(), "₹200");
        assert_eq!(Price::parse("12.5").unwrap().to_string(), "₹12.5");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: Price = serde_json::from_str("349").unwrap();
        let from_float: Price = serde_json::from_str("349.5").unwrap();
        let from_string: Price = serde_json::from_str("\"349\"").unwrap();
        assert_eq!(from_number, Price::from_rupees(349));
        assert_eq!(from_string, Price::from_rupees(349));
        assert_eq!(from_float.amount(), Decimal::new(3495, 1));
    }

    #[test]
    fn test_serializes_without_precision_loss() {
        let json = serde_json::to_string(&Price::from_rupees(100)).unwrap();
        assert_eq!(json, "\"100\"");

        let huge: Price = serde_json::from_str("\"79228162514264337593543950335\"").unwrap();
        let json = serde_json::to_string(&huge).unwrap();
        assert_eq!(json, "\"79228162514264337593543950335\"");
        assert_eq!(serde_json::from_str::<Price>(&json).unwrap(), huge);
    }

    #[test]
    fn test_arithmetic_saturates_on_overflow() {
        let huge: Price = serde_json::from_str("\"79228162514264337593543950335\"").unwrap();
        assert_eq!(huge.times(2).amount(), Decimal::MAX);
        assert_eq!((huge + Price::from_rupees(1)).amount(), Decimal::MAX);

        let total: Price = [huge.times(3), huge, Price::from_rupees(10)].into_iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);
    }
}
