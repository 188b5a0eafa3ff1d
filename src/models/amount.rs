//! Feed amount type
//!
//! Internally stores amounts in hundredths of a unit (i64) to avoid
//! floating-point drift when sheets are exported and read back. Amounts are
//! never negative.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative feed amount stored as hundredths of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedAmount(i64);

impl FeedAmount {
    /// Create an amount from hundredths of a unit
    ///
    /// # Examples
    /// ```
    /// use feed_ledger::models::FeedAmount;
    /// let amount = FeedAmount::from_hundredths(1050).unwrap(); // 10.50
    /// assert_eq!(amount.to_string(), "10.50");
    /// ```
    pub fn from_hundredths(hundredths: i64) -> Result<Self, AmountParseError> {
        if hundredths < 0 {
            return Err(AmountParseError::Negative(format!("{}", hundredths)));
        }
        Ok(Self(hundredths))
    }

    /// Create an amount from whole units
    pub fn from_units(units: i64) -> Result<Self, AmountParseError> {
        Self::from_hundredths(units * 100)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Convert a spreadsheet number, rounding to two decimal places
    pub fn from_f64(value: f64) -> Result<Self, AmountParseError> {
        if !value.is_finite() {
            return Err(AmountParseError::InvalidFormat(value.to_string()));
        }
        let hundredths = (value * 100.0).round();
        if hundredths < 0.0 {
            return Err(AmountParseError::Negative(value.to_string()));
        }
        if hundredths > i64::MAX as f64 {
            return Err(AmountParseError::InvalidFormat(value.to_string()));
        }
        Ok(Self(hundredths as i64))
    }

    /// Value written into spreadsheet number cells
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse an amount typed as text
    ///
    /// Accepts formats: "10", "10.5", "10.50", "1,250.75"
    pub fn parse(s: &str) -> Result<Self, AmountParseError> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(AmountParseError::Negative(trimmed.to_string()));
        }
        let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
        let invalid = || AmountParseError::InvalidFormat(trimmed.to_string());

        let (whole, frac) = match cleaned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (cleaned.as_str(), ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        // Pad or round the fraction to 2 digits
        let hundredths_part: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            2 => frac.parse().map_err(|_| invalid())?,
            _ => {
                let kept: i64 = frac[..2].parse().map_err(|_| invalid())?;
                let next = frac.as_bytes()[2] - b'0';
                kept + i64::from(next >= 5)
            }
        };

        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(hundredths_part))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Default for FeedAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for FeedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Error type for amount parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    InvalidFormat(String),
    Negative(String),
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountParseError::InvalidFormat(s) => write!(f, "Invalid amount format: {}", s),
            AmountParseError::Negative(s) => write!(f, "Amount cannot be negative: {}", s),
        }
    }
}

impl std::error::Error for AmountParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hundredths() {
        let a = FeedAmount::from_hundredths(1050).unwrap();
        assert_eq!(a.hundredths(), 1050);
        assert!(FeedAmount::from_hundredths(-1).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(FeedAmount::parse("10").unwrap().hundredths(), 1000);
        assert_eq!(FeedAmount::parse("10.5").unwrap().hundredths(), 1050);
        assert_eq!(FeedAmount::parse(" 10.50 ").unwrap().hundredths(), 1050);
        assert_eq!(FeedAmount::parse("1,250.75").unwrap().hundredths(), 125075);
        assert_eq!(FeedAmount::parse(".5").unwrap().hundredths(), 50);
        assert_eq!(FeedAmount::parse("2.345").unwrap().hundredths(), 235);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            FeedAmount::parse("ten"),
            Err(AmountParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            FeedAmount::parse("-3"),
            Err(AmountParseError::Negative(_))
        ));
        assert!(FeedAmount::parse("").is_err());
        assert!(FeedAmount::parse("1.2.3").is_err());
    }

    #[test]
    fn test_f64_conversion() {
        let a = FeedAmount::from_f64(12.345).unwrap();
        assert_eq!(a.hundredths(), 1235);
        assert_eq!(FeedAmount::from_f64(0.1 + 0.2).unwrap().hundredths(), 30);
        assert_eq!(a.to_f64(), 12.35);
        assert!(FeedAmount::from_f64(-0.5).is_err());
        assert!(FeedAmount::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(FeedAmount::from_hundredths(1555).unwrap().to_string(), "15.55");
        assert_eq!(FeedAmount::from_hundredths(5).unwrap().to_string(), "0.05");
        assert_eq!(FeedAmount::zero().to_string(), "0.00");
    }
}
