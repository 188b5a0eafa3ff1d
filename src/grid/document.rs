//! In-memory grid document
//!
//! A `GridDocument` is one sheet: a label, styled cells keyed by coordinate and
//! a list of merged regions. The builder produces it, the xlsx transport
//! writes and reads it, and the parser consumes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::coord::GridCoordinate;
use crate::error::LedgerResult;

/// Content of a single cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    /// Formula without the leading '=' and its last computed result
    Formula {
        expression: String,
        result: Option<f64>,
    },
}

impl CellValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A formula whose result has not been computed yet
    pub fn formula(expression: impl AsRef<str>) -> Self {
        Self::Formula {
            expression: expression.as_ref().trim_start_matches('=').to_string(),
            result: None,
        }
    }

    /// Empty cells and whitespace-only text count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric value as a spreadsheet would sum it
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Formula { result, .. } => *result,
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Presentation tag for a cell; has no meaning to the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    #[default]
    Plain,
    Title,
    Header,
    MonthLabel,
    DayEven,
    DayOdd,
    Total,
}

/// One cell of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub coordinate: GridCoordinate,
    pub value: CellValue,
    #[serde(default)]
    pub style: CellStyle,
}

/// Rectangle of cells shown as one; the value lives in `first`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRegion {
    pub first: GridCoordinate,
    pub last: GridCoordinate,
}

static EMPTY: CellValue = CellValue::Empty;

/// A single-sheet grid of cells
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridDocument {
    sheet_label: String,
    cells: BTreeMap<GridCoordinate, Cell>,
    merges: Vec<MergeRegion>,
}

/// Serialized form with cells flattened into row-major order
#[derive(Serialize)]
struct DocumentSnapshot {
    sheet_label: String,
    cells: Vec<Cell>,
    merges: Vec<MergeRegion>,
}

impl GridDocument {
    pub fn new(sheet_label: impl Into<String>) -> Self {
        Self {
            sheet_label: sheet_label.into(),
            cells: BTreeMap::new(),
            merges: Vec::new(),
        }
    }

    pub fn sheet_label(&self) -> &str {
        &self.sheet_label
    }

    /// Write a cell, replacing whatever was there
    pub fn set(&mut self, coordinate: GridCoordinate, value: CellValue, style: CellStyle) {
        self.cells.insert(
            coordinate,
            Cell {
                coordinate,
                value,
                style,
            },
        );
    }

    /// Replace only the value of a cell, keeping its style
    pub fn set_value(&mut self, coordinate: GridCoordinate, value: CellValue) {
        let style = self.cells.get(&coordinate).map(|c| c.style).unwrap_or_default();
        self.set(coordinate, value, style);
    }

    pub fn get(&self, coordinate: GridCoordinate) -> Option<&Cell> {
        self.cells.get(&coordinate)
    }

    /// Value at a coordinate; missing cells read as empty
    pub fn value(&self, coordinate: GridCoordinate) -> &CellValue {
        self.cells
            .get(&coordinate)
            .map(|c| &c.value)
            .unwrap_or(&EMPTY)
    }

    /// Trimmed text at a coordinate, if the cell holds text
    pub fn text(&self, coordinate: GridCoordinate) -> Option<&str> {
        self.value(coordinate).as_text().map(str::trim)
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn merge(&mut self, first: GridCoordinate, last: GridCoordinate) {
        self.merges.push(MergeRegion { first, last });
    }

    pub fn merges(&self) -> &[MergeRegion] {
        &self.merges
    }

    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|c| c.row).max().unwrap_or(0)
    }

    /// Number of columns a row occupies, counting merged regions
    ///
    /// Measured from column 1 to the right-most written or merged cell.
    pub fn used_columns(&self, row: u32) -> u32 {
        let written = self
            .cells
            .range(GridCoordinate::new(row, 1)..=GridCoordinate::new(row, u32::MAX))
            .map(|(coord, _)| coord.column)
            .max()
            .unwrap_or(0);
        let merged = self
            .merges
            .iter()
            .filter(|m| (m.first.row..=m.last.row).contains(&row))
            .map(|m| m.last.column)
            .max()
            .unwrap_or(0);
        written.max(merged)
    }

    /// Evaluate the formula (or plain number) at a coordinate
    ///
    /// Only `SUM` over cell references and ranges is understood; anything
    /// else evaluates to `None`. Referenced formulas contribute their stored
    /// result.
    pub fn evaluate(&self, coordinate: GridCoordinate) -> Option<f64> {
        match self.value(coordinate) {
            CellValue::Formula { expression, .. } => self.evaluate_expression(expression),
            other => other.as_number(),
        }
    }

    fn evaluate_expression(&self, expression: &str) -> Option<f64> {
        let expression = expression.trim().trim_start_matches('=');
        let upper = expression.to_ascii_uppercase();
        let args = upper.strip_prefix("SUM(")?.strip_suffix(')')?;

        let mut total = 0.0;
        for arg in args.split(',') {
            let (first, last) = match arg.split_once(':') {
                Some((a, b)) => (GridCoordinate::parse(a)?, GridCoordinate::parse(b)?),
                None => {
                    let single = GridCoordinate::parse(arg)?;
                    (single, single)
                }
            };
            for row in first.row.min(last.row)..=first.row.max(last.row) {
                let cols = first.column.min(last.column)..=first.column.max(last.column);
                total += self
                    .cells
                    .range(GridCoordinate::new(row, *cols.start())..=GridCoordinate::new(row, *cols.end()))
                    .filter_map(|(_, cell)| cell.value.as_number())
                    .sum::<f64>();
            }
        }
        Some(total)
    }

    /// Recompute every formula result in row-major order
    ///
    /// Formulas may only reference cells above or to the left of
    /// themselves, which holds for every formula the builder writes.
    pub fn recalculate(&mut self) {
        let formulas: Vec<GridCoordinate> = self
            .cells
            .iter()
            .filter(|(_, cell)| matches!(cell.value, CellValue::Formula { .. }))
            .map(|(coord, _)| *coord)
            .collect();

        for coord in formulas {
            let computed = self.evaluate(coord);
            if let Some(Cell {
                value: CellValue::Formula { result, .. },
                ..
            }) = self.cells.get_mut(&coord)
            {
                *result = computed;
            }
        }
    }

    /// Canonical byte form of the document
    ///
    /// Deterministic for equal documents: cells are emitted in row-major
    /// order and nothing time-dependent is included.
    pub fn to_bytes(&self) -> LedgerResult<Vec<u8>> {
        let snapshot = DocumentSnapshot {
            sheet_label: self.sheet_label.clone(),
            cells: self.cells.values().cloned().collect(),
            merges: self.merges.clone(),
        };
        Ok(serde_json::to_vec(&snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: u32, column: u32) -> GridCoordinate {
        GridCoordinate::new(row, column)
    }

    #[test]
    fn test_set_and_read() {
        let mut doc = GridDocument::new("รายเดือน");
        doc.set(c(1, 1), CellValue::text("  hello "), CellStyle::Title);
        doc.set(c(2, 3), CellValue::Number(4.5), CellStyle::Plain);

        assert_eq!(doc.sheet_label(), "รายเดือน");
        assert_eq!(doc.text(c(1, 1)), Some("hello"));
        assert_eq!(doc.value(c(2, 3)).as_number(), Some(4.5));
        assert_eq!(doc.value(c(9, 9)), &CellValue::Empty);
        assert_eq!(doc.max_row(), 2);
    }

    #[test]
    fn test_set_value_keeps_style() {
        let mut doc = GridDocument::new("x");
        doc.set(c(1, 1), CellValue::Empty, CellStyle::DayOdd);
        doc.set_value(c(1, 1), CellValue::Number(1.0));
        assert_eq!(doc.get(c(1, 1)).unwrap().style, CellStyle::DayOdd);
    }

    #[test]
    fn test_blank_values() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::formula("=SUM(A1:A2)").is_blank());
    }

    #[test]
    fn test_formula_strips_equals() {
        assert_eq!(
            CellValue::formula("=SUM(A1:B1)"),
            CellValue::Formula {
                expression: "SUM(A1:B1)".into(),
                result: None
            }
        );
    }

    #[test]
    fn test_sum_evaluation_and_recalculate() {
        let mut doc = GridDocument::new("x");
        doc.set(c(1, 1), CellValue::Number(10.0), CellStyle::Plain);
        doc.set(c(1, 2), CellValue::Number(5.0), CellStyle::Plain);
        doc.set(c(1, 3), CellValue::formula("SUM(A1:B1)"), CellStyle::Total);
        doc.set(c(2, 1), CellValue::text("note"), CellStyle::Plain);
        doc.set(c(3, 3), CellValue::formula("SUM(C1:C2,A1)"), CellStyle::Total);
        doc.set(c(4, 1), CellValue::formula("AVERAGE(A1:A2)"), CellStyle::Total);

        doc.recalculate();

        assert_eq!(doc.value(c(1, 3)).as_number(), Some(15.0));
        assert_eq!(doc.value(c(3, 3)).as_number(), Some(25.0));
        assert_eq!(doc.value(c(4, 1)).as_number(), None);
    }

    #[test]
    fn test_used_columns_counts_merges() {
        let mut doc = GridDocument::new("x");
        doc.merge(c(3, 1), c(5, 1));
        doc.set(c(3, 1), CellValue::text("label"), CellStyle::MonthLabel);
        doc.set(c(4, 2), CellValue::text("d"), CellStyle::DayEven);
        doc.set(c(4, 4), CellValue::Empty, CellStyle::DayEven);

        assert_eq!(doc.used_columns(4), 4);
        assert_eq!(doc.used_columns(5), 1);
        assert_eq!(doc.used_columns(6), 0);
    }

    #[test]
    fn test_bytes_ignore_insertion_order() {
        let mut first = GridDocument::new("รายปี");
        first.set(c(2, 1), CellValue::Number(1.25), CellStyle::DayOdd);
        first.set(c(1, 1), CellValue::formula("SUM(A2)"), CellStyle::Total);
        first.merge(c(3, 1), c(4, 1));
        first.recalculate();

        let mut second = GridDocument::new("รายปี");
        second.set(c(1, 1), CellValue::formula("SUM(A2)"), CellStyle::Total);
        second.set(c(2, 1), CellValue::Number(1.25), CellStyle::DayOdd);
        second.merge(c(3, 1), c(4, 1));
        second.recalculate();

        let bytes = first.to_bytes().unwrap();
        assert_eq!(second.to_bytes().unwrap(), bytes);
        assert!(String::from_utf8(bytes).unwrap().starts_with(r#"{"sheet_label":"รายปี""#));
    }
}
