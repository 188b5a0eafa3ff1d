//! Spreadsheet cell coordinates
//!
//! Rows and columns are 1-based. Columns are written with the bijective
//! base-26 letters spreadsheets use: A..Z, AA..AZ, BA, ...

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based (row, column) cell address
///
/// Ordering is row-major, which is the order cells are written and read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub row: u32,
    pub column: u32,
}

impl GridCoordinate {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Parse an "A1"-style reference
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim().trim_start_matches('$');
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = reference.split_at(split);
        let column = column_number(letters.trim_end_matches('$'))?;
        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(Self { row, column })
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row)
    }
}

/// Letters for a 1-based column number (1 -> "A", 27 -> "AA")
pub fn column_letters(column: u32) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 1-based column number for spreadsheet letters, case-insensitive
pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        acc.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)
    })
}
