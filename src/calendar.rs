//! Calendar arithmetic and Thai month-name tables
//!
//! Storage always uses Gregorian years. The Buddhist Era year (Gregorian
//! year + 543) appears only in labels written to exported sheets.

use crate::error::{LedgerError, LedgerResult};

/// Offset between the Gregorian year and the Buddhist Era display year
pub const DISPLAY_YEAR_OFFSET: i32 = 543;

/// Full Thai month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

/// Abbreviated Thai month names, January first
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

/// Gregorian leap-year rule
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`
///
/// Callers pass months in 1-12; anything else counts as a 31-day month.
pub const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Buddhist Era year shown in sheet labels
pub const fn display_year(year: i32) -> i32 {
    year.saturating_add(DISPLAY_YEAR_OFFSET)
}

/// Gregorian year for a Buddhist Era display year; `None` on overflow
pub const fn gregorian_year(display_year: i32) -> Option<i32> {
    display_year.checked_sub(DISPLAY_YEAR_OFFSET)
}

/// Full month name for `month` (1-12)
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[month_index(month)]
}

/// Abbreviated month name for `month` (1-12)
pub fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[month_index(month)]
}

fn month_index(month: u32) -> usize {
    (month.clamp(1, 12) - 1) as usize
}

/// Resolve a full month name back to its month number (1-12)
pub fn month_from_name(name: &str) -> LedgerResult<u32> {
    lookup(&MONTH_NAMES, name)
}

/// Resolve an abbreviated month name back to its month number (1-12)
pub fn month_from_abbreviation(abbreviation: &str) -> LedgerResult<u32> {
    lookup(&MONTH_ABBREVIATIONS, abbreviation)
}

fn lookup(table: &[&str; 12], text: &str) -> LedgerResult<u32> {
    table
        .iter()
        .position(|entry| *entry == text)
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| LedgerError::UnknownMonthName {
            name: text.to_string(),
            coordinate: None,
        })
}
