//! Document parser
//!
//! Validates an edited grid document against the template for the caller's
//! current pond layout, then walks it in builder order to recover the feed
//! records. The first problem found aborts the parse; nothing partial is
//! returned.

use tracing::debug;

use super::coord::GridCoordinate;
use super::document::{CellValue, GridDocument};
use super::layout::{LayoutPlan, MonthBlock};
use super::template::{
    self, metadata_cell, TemplateDescriptor, COLLECTION_ID_COLUMN, DISPLAY_YEAR_COLUMN,
    FARM_NAME_COLUMN, FIRST_DAY_ROW, MONTH_LABEL_COLUMN, TOTAL_MARKER,
};
use crate::calendar::{gregorian_year, month_from_name};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    FeedAmount, FeedCollectionId, FeedPeriod, FeedRecord, PeriodKind, PeriodParseError,
    PondColumn,
};

/// Records recovered from a document, with the period it covers
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub period: FeedPeriod,
    pub farm_name: String,
    pub records: Vec<FeedRecord>,
}

/// Parses documents for one farm's pond layout and one feed collection
pub struct DocumentParser<'a> {
    ponds: &'a [PondColumn],
    collection_id: FeedCollectionId,
    pond_name_prefix: &'a str,
}

impl<'a> DocumentParser<'a> {
    pub fn new(
        ponds: &'a [PondColumn],
        collection_id: FeedCollectionId,
        pond_name_prefix: &'a str,
    ) -> Self {
        Self {
            ponds,
            collection_id,
            pond_name_prefix,
        }
    }

    /// Validate the document shape, then extract its records
    pub fn parse(&self, doc: &GridDocument) -> LedgerResult<ParsedDocument> {
        let kind = template::kind_for_label(doc.sheet_label()).ok_or_else(|| {
            LedgerError::UnrecognizedDocumentKind {
                label: doc.sheet_label().to_string(),
            }
        })?;

        let (year, farm_name) = self.read_metadata(doc)?;
        let template = TemplateDescriptor::new(self.ponds.len());
        self.check_headers(doc, &template)?;

        let first_label = GridCoordinate::new(FIRST_DAY_ROW, MONTH_LABEL_COLUMN);
        let first_month = read_month(doc, first_label)?;
        let period = match kind {
            PeriodKind::Monthly => FeedPeriod::monthly(year, first_month).map_err(|e| match e {
                PeriodParseError::YearOutOfRange(_) => unsupported_year(e.to_string()),
                _ => LedgerError::StaleTemplate {
                    coordinate: first_label,
                    reason: e.to_string(),
                },
            })?,
            PeriodKind::Yearly if first_month != 1 => {
                return Err(LedgerError::StaleTemplate {
                    coordinate: first_label,
                    reason: format!(
                        "yearly sheet starts with {} instead of {}",
                        template::month_label(first_month),
                        template::month_label(1)
                    ),
                });
            }
            PeriodKind::Yearly => {
                FeedPeriod::yearly(year).map_err(|e| unsupported_year(e.to_string()))?
            }
        };

        let plan = LayoutPlan::new(period, self.ponds.len());
        let mut records = Vec::new();
        for block in &plan.blocks {
            self.check_block_label(doc, block)?;
            self.extract_block(doc, &template, block, &mut records)?;
        }

        debug!(
            period = %period,
            records = records.len(),
            "parsed feed ledger document"
        );
        Ok(ParsedDocument {
            period,
            farm_name,
            records,
        })
    }

    /// Row 1: collection id, farm name and display year
    fn read_metadata(&self, doc: &GridDocument) -> LedgerResult<(i32, String)> {
        let id_cell = metadata_cell(COLLECTION_ID_COLUMN);
        let collection = integer_cell(doc, id_cell).ok_or_else(|| malformed(id_cell, doc))?;
        if collection != self.collection_id.get() {
            return Err(LedgerError::MalformedHeader {
                coordinate: id_cell,
                reason: format!(
                    "sheet is for collection {}, expected {}",
                    collection,
                    self.collection_id.get()
                ),
            });
        }

        let farm_cell = metadata_cell(FARM_NAME_COLUMN);
        let farm_name = doc
            .text(farm_cell)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| malformed(farm_cell, doc))?
            .to_string();

        let year_cell = metadata_cell(DISPLAY_YEAR_COLUMN);
        let year = integer_cell(doc, year_cell)
            .and_then(|year| i32::try_from(year).ok())
            .and_then(gregorian_year)
            .ok_or_else(|| malformed(year_cell, doc))?;
        FeedPeriod::yearly(year).map_err(|e| unsupported_year(e.to_string()))?;

        Ok((year, farm_name))
    }

    /// Row 2: the total marker must sit right after the current ponds, and
    /// the pond headers must name the current ponds in order
    fn check_headers(&self, doc: &GridDocument, template: &TemplateDescriptor) -> LedgerResult<()> {
        let total_header = template.total_header();
        if doc.text(total_header) != Some(TOTAL_MARKER) {
            return Err(LedgerError::StaleTemplate {
                coordinate: total_header,
                reason: format!(
                    "expected '{}' after {} pond column(s), found {}",
                    TOTAL_MARKER,
                    template.pond_count(),
                    describe(doc.value(total_header))
                ),
            });
        }

        for (idx, pond) in self.ponds.iter().enumerate() {
            let header = template.pond_header(idx);
            let expected = pond.header_label(self.pond_name_prefix);
            if header_text(doc.value(header)).as_deref() != Some(expected.as_str()) {
                return Err(LedgerError::StaleTemplate {
                    coordinate: header,
                    reason: format!(
                        "expected pond '{}', found {}",
                        expected,
                        describe(doc.value(header))
                    ),
                });
            }
        }
        Ok(())
    }

    fn check_block_label(&self, doc: &GridDocument, block: &MonthBlock) -> LedgerResult<()> {
        let label = block.label_cell(MONTH_LABEL_COLUMN);
        let month = read_month(doc, label)?;
        if month != block.month {
            return Err(LedgerError::StaleTemplate {
                coordinate: label,
                reason: format!(
                    "expected {} block, found {}",
                    template::month_label(block.month),
                    template::month_label(month)
                ),
            });
        }
        Ok(())
    }

    fn extract_block(
        &self,
        doc: &GridDocument,
        template: &TemplateDescriptor,
        block: &MonthBlock,
        records: &mut Vec<FeedRecord>,
    ) -> LedgerResult<()> {
        for (day, row) in block.day_rows() {
            let date = block.date(day).ok_or_else(|| {
                unsupported_year(format!(
                    "no calendar date for day {} of month {}",
                    day, block.month
                ))
            })?;
            for (idx, pond) in self.ponds.iter().enumerate() {
                let coordinate = GridCoordinate::new(row, template.pond_column(idx));
                if let Some(amount) = read_amount(doc.value(coordinate), coordinate)? {
                    records.push(FeedRecord::new(pond.pond_id, self.collection_id, amount, date));
                }
            }
        }
        Ok(())
    }
}

/// Amount in a pond cell; `None` for blank cells
fn read_amount(value: &CellValue, coordinate: GridCoordinate) -> LedgerResult<Option<FeedAmount>> {
    let invalid = |text: String| LedgerError::InvalidAmount { coordinate, text };
    match value {
        value if value.is_blank() => Ok(None),
        CellValue::Number(n) => FeedAmount::from_f64(*n)
            .map(Some)
            .map_err(|_| invalid(n.to_string())),
        CellValue::Text(text) => FeedAmount::parse(text)
            .map(Some)
            .map_err(|_| invalid(text.clone())),
        CellValue::Formula {
            result: Some(n), ..
        } => FeedAmount::from_f64(*n)
            .map(Some)
            .map_err(|_| invalid(n.to_string())),
        CellValue::Formula { expression, .. } => Err(invalid(format!("={}", expression))),
        CellValue::Empty => Ok(None),
    }
}

fn read_month(doc: &GridDocument, coordinate: GridCoordinate) -> LedgerResult<u32> {
    let name = doc.text(coordinate).unwrap_or_default();
    month_from_name(name).map_err(|_| LedgerError::UnknownMonthName {
        name: name.to_string(),
        coordinate: Some(coordinate),
    })
}

/// Whole number held by a cell, as a number or as numeric text
fn integer_cell(doc: &GridDocument, coordinate: GridCoordinate) -> Option<i64> {
    match doc.value(coordinate) {
        CellValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
        CellValue::Text(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Header text; spreadsheet apps turn headers like "3" into numbers
fn header_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Text(text) => Some(text.trim().to_string()),
        CellValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
        _ => None,
    }
}

/// The display year names a year that cannot be dated
fn unsupported_year(reason: String) -> LedgerError {
    LedgerError::MalformedHeader {
        coordinate: metadata_cell(DISPLAY_YEAR_COLUMN),
        reason,
    }
}

fn malformed(coordinate: GridCoordinate, doc: &GridDocument) -> LedgerError {
    LedgerError::MalformedHeader {
        coordinate,
        reason: format!("unexpected {}", describe(doc.value(coordinate))),
    }
}

fn describe(value: &CellValue) -> String {
    match value {
        CellValue::Empty => "an empty cell".to_string(),
        CellValue::Number(n) => format!("number {}", n),
        CellValue::Text(text) => format!("'{}'", text.trim()),
        CellValue::Formula { expression, .. } => format!("formula ={}", expression),
    }
}
