//! XLSX transport for grid documents
//!
//! Writing goes through `rust_xlsxwriter`, reading through `calamine`. Only
//! the first worksheet is read back; styles are not, since the parser never
//! looks at them.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder, Formula, Workbook,
    Worksheet,
};
use tracing::debug;

use super::coord::GridCoordinate;
use super::document::{CellStyle, CellValue, GridDocument};
use crate::error::{LedgerError, LedgerResult};
use crate::storage::write_bytes_atomic;

const AMOUNT_FORMAT: &str = "#,##0.00";
const DATE_COLUMN_WIDTH: f64 = 14.0;
const MONTH_COLUMN_WIDTH: f64 = 12.0;

/// One `Format` per style tag
struct StyleSheet {
    formats: HashMap<CellStyle, Format>,
}

impl StyleSheet {
    fn new() -> Self {
        let base = Format::new().set_border(FormatBorder::Thin);
        let mut formats = HashMap::new();
        formats.insert(CellStyle::Plain, base.clone());
        formats.insert(CellStyle::Title, Format::new().set_bold());
        formats.insert(
            CellStyle::Header,
            base.clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(Color::RGB(0x1F4E78))
                .set_font_color(Color::White),
        );
        formats.insert(
            CellStyle::MonthLabel,
            base.clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
        );
        formats.insert(
            CellStyle::DayEven,
            base.clone()
                .set_num_format(AMOUNT_FORMAT)
                .set_background_color(Color::RGB(0xDDEBF7)),
        );
        formats.insert(CellStyle::DayOdd, base.clone().set_num_format(AMOUNT_FORMAT));
        formats.insert(
            CellStyle::Total,
            base.set_bold()
                .set_num_format(AMOUNT_FORMAT)
                .set_background_color(Color::RGB(0xFCE4D6)),
        );
        Self { formats }
    }

    fn get(&self, style: CellStyle) -> &Format {
        &self.formats[&style]
    }
}

/// Serialize a document as an XLSX workbook with one worksheet
///
/// The creation time in the document properties is pinned, so equal
/// documents give equal bytes.
pub fn to_xlsx_bytes(doc: &GridDocument) -> LedgerResult<Vec<u8>> {
    let styles = StyleSheet::new();
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
    let worksheet = workbook.add_worksheet().set_name(doc.sheet_label())?;

    for region in doc.merges() {
        let (first_row, first_col) = to_zero_based(region.first)?;
        let (last_row, last_col) = to_zero_based(region.last)?;
        let (text, style) = match doc.get(region.first) {
            Some(cell) => (cell.value.as_text().unwrap_or_default(), cell.style),
            None => ("", CellStyle::Plain),
        };
        worksheet.merge_range(
            first_row,
            first_col,
            last_row,
            last_col,
            text,
            styles.get(style),
        )?;
    }

    let mut written = 0usize;
    for cell in doc.cells() {
        if doc.merges().iter().any(|m| m.first == cell.coordinate) {
            continue;
        }
        write_cell(worksheet, &styles, cell.coordinate, &cell.value, cell.style)?;
        written += 1;
    }

    worksheet.set_column_width(0, MONTH_COLUMN_WIDTH)?;
    worksheet.set_column_width(1, DATE_COLUMN_WIDTH)?;
    worksheet.set_freeze_panes(2, 2)?;

    let bytes = workbook.save_to_buffer()?;
    debug!(
        sheet = doc.sheet_label(),
        cells = written,
        merges = doc.merges().len(),
        bytes = bytes.len(),
        "wrote xlsx workbook"
    );
    Ok(bytes)
}

fn write_cell(
    worksheet: &mut Worksheet,
    styles: &StyleSheet,
    coordinate: GridCoordinate,
    value: &CellValue,
    style: CellStyle,
) -> LedgerResult<()> {
    let (row, col) = to_zero_based(coordinate)?;
    let format = styles.get(style);
    match value {
        CellValue::Empty => {
            worksheet.write_blank(row, col, format)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Text(text) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        CellValue::Formula { expression, result } => {
            let mut formula = Formula::new(expression);
            if let Some(result) = result {
                formula = formula.set_result(result.to_string());
            }
            worksheet.write_formula_with_format(row, col, formula, format)?;
        }
    }
    Ok(())
}

/// Read the first worksheet of an XLSX workbook
pub fn from_xlsx_bytes(bytes: &[u8]) -> LedgerResult<GridDocument> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LedgerError::Import("workbook has no worksheets".into()))?;

    let mut doc = GridDocument::new(sheet_name.clone());

    let range = workbook.worksheet_range(&sheet_name)?;
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    for (row, col, data) in range.used_cells() {
        let coordinate = GridCoordinate::new(
            row_offset + row as u32 + 1,
            col_offset + col as u32 + 1,
        );
        let value = match data {
            Data::Float(n) => CellValue::Number(*n),
            Data::Int(n) => CellValue::Number(*n as f64),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            Data::Empty => continue,
            other => CellValue::Text(other.to_string()),
        };
        doc.set(coordinate, value, CellStyle::Plain);
    }

    let formulas = workbook.worksheet_formula(&sheet_name)?;
    let (row_offset, col_offset) = formulas.start().unwrap_or((0, 0));
    for (row, col, expression) in formulas.used_cells() {
        if expression.is_empty() {
            continue;
        }
        let coordinate = GridCoordinate::new(
            row_offset + row as u32 + 1,
            col_offset + col as u32 + 1,
        );
        let result = doc.value(coordinate).as_number();
        doc.set_value(
            coordinate,
            CellValue::Formula {
                expression: expression.trim_start_matches('=').to_string(),
                result,
            },
        );
    }

    workbook.load_merged_regions()?;
    for (_, _, dimensions) in workbook.merged_regions_by_sheet(&sheet_name) {
        doc.merge(
            GridCoordinate::new(dimensions.start.0 + 1, dimensions.start.1 + 1),
            GridCoordinate::new(dimensions.end.0 + 1, dimensions.end.1 + 1),
        );
    }

    debug!(
        sheet = %sheet_name,
        cells = doc.cells().count(),
        merges = doc.merges().len(),
        "read xlsx workbook"
    );
    Ok(doc)
}

/// Write a document to an `.xlsx` file, replacing it atomically
pub fn write_xlsx(doc: &GridDocument, path: &Path) -> LedgerResult<()> {
    let bytes = to_xlsx_bytes(doc)?;
    write_bytes_atomic(path, &bytes)
}

/// Read a document from an `.xlsx` file
pub fn read_xlsx(path: &Path) -> LedgerResult<GridDocument> {
    let bytes = fs::read(path)
        .map_err(|e| LedgerError::Import(format!("Failed to read {}: {}", path.display(), e)))?;
    from_xlsx_bytes(&bytes)
}

fn to_zero_based(coordinate: GridCoordinate) -> LedgerResult<(u32, u16)> {
    let out_of_range =
        || LedgerError::Export(format!("cell {} is outside the worksheet", coordinate));
    let row = coordinate.row.checked_sub(1).ok_or_else(out_of_range)?;
    let column = coordinate
        .column
        .checked_sub(1)
        .and_then(|column| u16::try_from(column).ok())
        .ok_or_else(out_of_range)?;
    Ok((row, column))
}
