//! The feed-ledger sheet template
//!
//! Every fixed position and marker text of the exported sheet lives here.
//! Builder and parser both read them from `TemplateDescriptor`, so the two
//! directions cannot disagree about where anything is.
//!
//! ```text
//!        A            B              C..        (3+N)
//! 1  collection id | collection | farm name | display year
//! 2  เดือน         | วันที่      | pond names | รวม
//! 3  มกราคม        | 1 ม.ค. 2564 | amounts    | =SUM(row)
//! .. (merged)      | ...         |            |
//! 33               | 31 ม.ค. ... |            |
//! 34               | รวม มกราคม  | =SUM(col)  | =SUM(total col)
//! ```
//!
//! Yearly sheets repeat the block for every month and close with a
//! `รวมทั้งปี` row that adds up the twelve month totals.
//!
//! Any change here is a breaking change to the file format.

use super::coord::{column_letters, GridCoordinate};
use crate::calendar::{display_year, month_abbreviation, month_name};
use crate::models::PeriodKind;

/// Row holding collection, farm and year metadata
pub const METADATA_ROW: u32 = 1;
/// Row holding column headers
pub const HEADER_ROW: u32 = 2;
/// First row of the first month block
pub const FIRST_DAY_ROW: u32 = 3;

pub const MONTH_LABEL_COLUMN: u32 = 1;
pub const DATE_COLUMN: u32 = 2;
pub const FIRST_POND_COLUMN: u32 = 3;

pub const COLLECTION_ID_COLUMN: u32 = 1;
pub const COLLECTION_NAME_COLUMN: u32 = 2;
pub const FARM_NAME_COLUMN: u32 = 3;
pub const DISPLAY_YEAR_COLUMN: u32 = 4;

/// Sheet label of single-month documents
pub const MONTHLY_SHEET_LABEL: &str = "รายเดือน";
/// Sheet label of whole-year documents
pub const YEARLY_SHEET_LABEL: &str = "รายปี";

pub const MONTH_HEADER: &str = "เดือน";
pub const DATE_HEADER: &str = "วันที่";
/// Marker in the total-column header and in month total labels
pub const TOTAL_MARKER: &str = "รวม";
/// Label of the grand-total row closing a yearly sheet
pub const PERIOD_TOTAL_LABEL: &str = "รวมทั้งปี";

/// Column positions of a sheet with a given number of ponds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pond_count: u32,
}

impl TemplateDescriptor {
    pub fn new(pond_count: usize) -> Self {
        Self {
            pond_count: pond_count as u32,
        }
    }

    pub fn pond_count(&self) -> u32 {
        self.pond_count
    }

    /// Column of the pond at `index` (0-based, list order)
    pub fn pond_column(&self, index: usize) -> u32 {
        FIRST_POND_COLUMN + index as u32
    }

    pub fn pond_columns(&self) -> std::ops::Range<u32> {
        FIRST_POND_COLUMN..self.total_column()
    }

    /// Row-total column, right after the last pond
    pub fn total_column(&self) -> u32 {
        FIRST_POND_COLUMN + self.pond_count
    }

    /// Header cell that must carry the total marker
    pub fn total_header(&self) -> GridCoordinate {
        GridCoordinate::new(HEADER_ROW, self.total_column())
    }

    /// Header cell for the pond at `index`
    pub fn pond_header(&self, index: usize) -> GridCoordinate {
        GridCoordinate::new(HEADER_ROW, self.pond_column(index))
    }

    /// `SUM` across the pond cells of one row; `None` when there are no ponds
    pub fn row_total_formula(&self, row: u32) -> Option<String> {
        if self.pond_count == 0 {
            return None;
        }
        Some(format!(
            "SUM({}{}:{}{})",
            column_letters(FIRST_POND_COLUMN),
            row,
            column_letters(self.total_column() - 1),
            row
        ))
    }

    /// `SUM` down one column between two rows (inclusive)
    pub fn column_total_formula(&self, column: u32, first_row: u32, last_row: u32) -> String {
        let letters = column_letters(column);
        format!("SUM({letters}{first_row}:{letters}{last_row})")
    }

    /// `SUM` of one column picked out at each of `rows`
    pub fn period_total_formula(&self, column: u32, rows: &[u32]) -> String {
        let letters = column_letters(column);
        let cells: Vec<String> = rows.iter().map(|row| format!("{letters}{row}")).collect();
        format!("SUM({})", cells.join(","))
    }
}

pub fn metadata_cell(column: u32) -> GridCoordinate {
    GridCoordinate::new(METADATA_ROW, column)
}

/// Sheet label for a period kind
pub fn sheet_label(kind: PeriodKind) -> &'static str {
    match kind {
        PeriodKind::Monthly => MONTHLY_SHEET_LABEL,
        PeriodKind::Yearly => YEARLY_SHEET_LABEL,
    }
}

/// Period kind for a sheet label, if it is one of ours
pub fn kind_for_label(label: &str) -> Option<PeriodKind> {
    match label.trim() {
        MONTHLY_SHEET_LABEL => Some(PeriodKind::Monthly),
        YEARLY_SHEET_LABEL => Some(PeriodKind::Yearly),
        _ => None,
    }
}

/// Date-column label: day, abbreviated month, display year ("1 ม.ค. 2564")
pub fn date_label(year: i32, month: u32, day: u32) -> String {
    format!("{} {} {}", day, month_abbreviation(month), display_year(year))
}

/// Month label written into the merged first column of a block
pub fn month_label(month: u32) -> &'static str {
    month_name(month)
}

/// Label of a month block's total row ("รวม มกราคม")
pub fn month_total_label(month: u32) -> String {
    format!("{} {}", TOTAL_MARKER, month_name(month))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_for_two_ponds() {
        let template = TemplateDescriptor::new(2);
        assert_eq!(template.pond_column(0), 3);
        assert_eq!(template.pond_column(1), 4);
        assert_eq!(template.total_column(), 5);
        assert_eq!(template.pond_columns().collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(template.total_header().to_string(), "E2");
    }

    #[test]
    fn test_formulas() {
        let template = TemplateDescriptor::new(2);
        assert_eq!(template.row_total_formula(3).as_deref(), Some("SUM(C3:D3)"));
        assert_eq!(template.column_total_formula(3, 3, 33), "SUM(C3:C33)");
        assert_eq!(TemplateDescriptor::new(0).row_total_formula(3), None);
        assert_eq!(
            template.period_total_formula(5, &[34, 63, 95]),
            "SUM(E34,E63,E95)"
        );
    }

    #[test]
    fn test_sheet_labels() {
        assert_eq!(kind_for_label(sheet_label(PeriodKind::Monthly)), Some(PeriodKind::Monthly));
        assert_eq!(kind_for_label(sheet_label(PeriodKind::Yearly)), Some(PeriodKind::Yearly));
        assert_eq!(kind_for_label("Sheet1"), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(date_label(2021, 1, 1), "1 ม.ค. 2564");
        assert_eq!(month_label(2), "กุมภาพันธ์");
        assert_eq!(month_total_label(1), "รวม มกราคม");
    }
}
