//! Feed ledger period representation
//!
//! A period is a Gregorian year with an optional month. Without a month the
//! period covers the whole year.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::days_in_month;

/// Whether a sheet covers one month or a whole year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Monthly,
    Yearly,
}

/// The (year, optional month) scope a ledger grid covers
///
/// The year must be one chrono can date from January 1 to December 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct FeedPeriod {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
}

impl FeedPeriod {
    /// Create a single-month period
    pub fn monthly(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::InvalidMonth(month));
        }
        Ok(Self {
            year,
            month: Some(month),
        })
    }

    /// Create a whole-year period
    pub fn yearly(year: i32) -> Result<Self, PeriodParseError> {
        check_year(year)?;
        Ok(Self { year, month: None })
    }

    pub fn kind(&self) -> PeriodKind {
        match self.month {
            Some(_) => PeriodKind::Monthly,
            None => PeriodKind::Yearly,
        }
    }

    /// Months covered by this period, in sheet order
    pub fn months(&self) -> Vec<u32> {
        match self.month {
            Some(month) => vec![month],
            None => (1..=12).collect(),
        }
    }

    /// First day of the period
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), 1)
    }

    /// Last day of the period (inclusive)
    pub fn end_date(&self) -> Option<NaiveDate> {
        let month = self.month.unwrap_or(12);
        NaiveDate::from_ymd_opt(self.year, month, days_in_month(self.year, month))
    }

    /// Check if a date falls within this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start_date(), self.end_date()) {
            (Some(start), Some(end)) => date >= start && date <= end,
            _ => false,
        }
    }

    /// Parse a period string
    ///
    /// Formats:
    /// - Monthly: "2025-01"
    /// - Yearly: "2025"
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let invalid = || PeriodParseError::InvalidFormat(s.to_string());

        match s.split_once('-') {
            Some((year, month)) => {
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                Self::monthly(year, month)
            }
            None => Self::yearly(s.parse().map_err(|_| invalid())?),
        }
    }
}

fn check_year(year: i32) -> Result<(), PeriodParseError> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    let last = NaiveDate::from_ymd_opt(year, 12, 31);
    match (first, last) {
        (Some(_), Some(_)) => Ok(()),
        _ => Err(PeriodParseError::YearOutOfRange(year)),
    }
}

#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    #[serde(default)]
    month: Option<u32>,
}

impl TryFrom<RawPeriod> for FeedPeriod {
    type Error = PeriodParseError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        match raw.month {
            Some(month) => Self::monthly(raw.year, month),
            None => Self::yearly(raw.year),
        }
    }
}

impl fmt::Display for FeedPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(month) => write!(f, "{:04}-{:02}", self.year, month),
            None => write!(f, "{:04}", self.year),
        }
    }
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
    YearOutOfRange(i32),
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodParseError::InvalidFormat(s) => write!(f, "Invalid period format: {}", s),
            PeriodParseError::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
            PeriodParseError::YearOutOfRange(y) => write!(f, "Year out of range: {}", y),
        }
    }
}

impl std::error::Error for PeriodParseError {}
