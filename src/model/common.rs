use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// A strictly positive decimal amount, kept as the original string so prices
/// survive transport and storage without binary-float rounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(String);

#[derive(Debug, thiserror::Error)]
#[error("price must be a positive decimal number")]
pub struct InvalidPrice;

impl Price {
    /// Accepts `12` and `12.50` style values; rejects empty, negative, zero,
    /// and anything that is not plain decimal digits with an optional
    /// fractional part.
    pub fn parse(raw: &str) -> Result<Self, InvalidPrice> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidPrice);
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (trimmed, None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidPrice);
        }
        if let Some(f) = fraction {
            if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) {
                return Err(InvalidPrice);
            }
        }

        // Strictly positive: at least one non-zero digit somewhere.
        let positive = whole
            .bytes()
            .chain(fraction.unwrap_or("").bytes())
            .any(|b| b != b'0');
        if !positive {
            return Err(InvalidPrice);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Price {
    type Error = InvalidPrice;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Price::parse(&value)
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whole_and_fractional_prices() {
        assert_eq!(Price::parse("12").unwrap().as_str(), "12");
        assert_eq!(Price::parse("12.50").unwrap().as_str(), "12.50");
        assert_eq!(Price::parse(" 7.5 ").unwrap().as_str(), "7.5");
    }

    #[test]
    fn rejects_non_positive_and_malformed_prices() {
        for bad in ["0", "0.00", "-5", "abc", "", "  ", "12.", ".5", "1.2.3", "+3"] {
            assert!(Price::parse(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn deserializes_with_validation() {
        let price: Price = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(price.as_str(), "19.99");
        assert!(serde_json::from_str::<Price>("\"-1\"").is_err());
    }
}
