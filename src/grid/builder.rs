//! Document builder
//!
//! Lays a period's feed amounts out on the sheet template. Building has no
//! side effects and is deterministic: the same inputs always produce equal
//! documents.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use super::coord::GridCoordinate;
use super::document::{CellStyle, CellValue, GridDocument};
use super::layout::{LayoutPlan, MonthBlock};
use super::template::{
    self, metadata_cell, TemplateDescriptor, COLLECTION_ID_COLUMN, COLLECTION_NAME_COLUMN,
    DATE_COLUMN, DATE_HEADER, DISPLAY_YEAR_COLUMN, FARM_NAME_COLUMN, HEADER_ROW,
    MONTH_HEADER, MONTH_LABEL_COLUMN, PERIOD_TOTAL_LABEL, TOTAL_MARKER,
};
use crate::calendar::display_year;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{FeedAmount, FeedCollectionId, FeedPeriod, PondColumn, PondId};

/// Feed amounts keyed by pond and day
pub type AmountMap = HashMap<(PondId, NaiveDate), FeedAmount>;

/// What the sheet is about, written into the metadata row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerMetadata {
    pub collection_id: FeedCollectionId,
    pub collection_name: String,
    pub farm_name: String,
    pub period: FeedPeriod,
}

/// Builds grid documents for one farm's pond layout
pub struct DocumentBuilder<'a> {
    ponds: &'a [PondColumn],
    pond_name_prefix: &'a str,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(ponds: &'a [PondColumn], pond_name_prefix: &'a str) -> Self {
        Self {
            ponds,
            pond_name_prefix,
        }
    }

    /// Build the sheet for `metadata.period` from the recorded amounts
    ///
    /// Amounts for dates outside the period, or for ponds not in the column
    /// list, are left out. A period whose year chrono cannot date is a
    /// validation error.
    pub fn build(&self, metadata: &LedgerMetadata, amounts: &AmountMap) -> LedgerResult<GridDocument> {
        let plan = LayoutPlan::new(metadata.period, self.ponds.len());
        let mut doc = GridDocument::new(template::sheet_label(metadata.period.kind()));

        self.write_metadata(&mut doc, metadata);
        self.write_headers(&mut doc, &plan.template);

        let mut written = 0usize;
        for block in &plan.blocks {
            written += self.write_block(&mut doc, &plan.template, block, amounts)?;
        }
        if let Some(row) = plan.period_total_row {
            self.write_period_total(&mut doc, &plan.template, row, &plan.month_total_rows());
        }
        doc.recalculate();

        debug!(
            period = %metadata.period,
            ponds = self.ponds.len(),
            amounts = written,
            skipped = amounts.len().saturating_sub(written),
            "built feed ledger document"
        );
        Ok(doc)
    }

    fn write_metadata(&self, doc: &mut GridDocument, metadata: &LedgerMetadata) {
        doc.set(
            metadata_cell(COLLECTION_ID_COLUMN),
            CellValue::Number(metadata.collection_id.get() as f64),
            CellStyle::Title,
        );
        doc.set(
            metadata_cell(COLLECTION_NAME_COLUMN),
            CellValue::text(metadata.collection_name.clone()),
            CellStyle::Title,
        );
        doc.set(
            metadata_cell(FARM_NAME_COLUMN),
            CellValue::text(metadata.farm_name.clone()),
            CellStyle::Title,
        );
        doc.set(
            metadata_cell(DISPLAY_YEAR_COLUMN),
            CellValue::Number(f64::from(display_year(metadata.period.year))),
            CellStyle::Title,
        );
    }

    fn write_headers(&self, doc: &mut GridDocument, template: &TemplateDescriptor) {
        let header = |column| GridCoordinate::new(HEADER_ROW, column);
        doc.set(header(MONTH_LABEL_COLUMN), CellValue::text(MONTH_HEADER), CellStyle::Header);
        doc.set(header(DATE_COLUMN), CellValue::text(DATE_HEADER), CellStyle::Header);
        for (idx, pond) in self.ponds.iter().enumerate() {
            doc.set(
                template.pond_header(idx),
                CellValue::text(pond.header_label(self.pond_name_prefix)),
                CellStyle::Header,
            );
        }
        doc.set(template.total_header(), CellValue::text(TOTAL_MARKER), CellStyle::Header);
    }

    /// Write one month block, returning how many amounts were placed
    fn write_block(
        &self,
        doc: &mut GridDocument,
        template: &TemplateDescriptor,
        block: &MonthBlock,
        amounts: &AmountMap,
    ) -> LedgerResult<usize> {
        let mut written = 0;

        doc.merge(
            block.label_cell(MONTH_LABEL_COLUMN),
            GridCoordinate::new(block.last_day_row, MONTH_LABEL_COLUMN),
        );
        doc.set(
            block.label_cell(MONTH_LABEL_COLUMN),
            CellValue::text(template::month_label(block.month)),
            CellStyle::MonthLabel,
        );

        for (day, row) in block.day_rows() {
            let style = if day % 2 == 0 {
                CellStyle::DayEven
            } else {
                CellStyle::DayOdd
            };
            doc.set(
                GridCoordinate::new(row, DATE_COLUMN),
                CellValue::text(template::date_label(block.year, block.month, day)),
                style,
            );

            let date = block.date(day).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "year {} is outside the supported calendar range",
                    block.year
                ))
            })?;
            for (idx, pond) in self.ponds.iter().enumerate() {
                let amount = amounts.get(&(pond.pond_id, date));
                let value = match amount {
                    Some(amount) => {
                        written += 1;
                        CellValue::Number(amount.to_f64())
                    }
                    None => CellValue::Empty,
                };
                doc.set(GridCoordinate::new(row, template.pond_column(idx)), value, style);
            }

            let total = match template.row_total_formula(row) {
                Some(formula) => CellValue::formula(formula),
                None => CellValue::Number(0.0),
            };
            doc.set(GridCoordinate::new(row, template.total_column()), total, style);
        }

        self.write_month_total(doc, template, block);
        Ok(written)
    }

    fn write_month_total(
        &self,
        doc: &mut GridDocument,
        template: &TemplateDescriptor,
        block: &MonthBlock,
    ) {
        let row = block.total_row;
        doc.set(
            GridCoordinate::new(row, MONTH_LABEL_COLUMN),
            CellValue::Empty,
            CellStyle::Total,
        );
        doc.set(
            GridCoordinate::new(row, DATE_COLUMN),
            CellValue::text(template::month_total_label(block.month)),
            CellStyle::Total,
        );
        for column in template.pond_columns().chain([template.total_column()]) {
            doc.set(
                GridCoordinate::new(row, column),
                CellValue::formula(template.column_total_formula(
                    column,
                    block.first_day_row,
                    block.last_day_row,
                )),
                CellStyle::Total,
            );
        }
    }

    /// Closing row of a yearly sheet: each column summed over the month totals
    fn write_period_total(
        &self,
        doc: &mut GridDocument,
        template: &TemplateDescriptor,
        row: u32,
        month_totals: &[u32],
    ) {
        doc.set(
            GridCoordinate::new(row, MONTH_LABEL_COLUMN),
            CellValue::Empty,
            CellStyle::Total,
        );
        doc.set(
            GridCoordinate::new(row, DATE_COLUMN),
            CellValue::text(PERIOD_TOTAL_LABEL),
            CellStyle::Total,
        );
        for column in template.pond_columns().chain([template.total_column()]) {
            doc.set(
                GridCoordinate::new(row, column),
                CellValue::formula(template.period_total_formula(column, month_totals)),
                CellStyle::Total,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::template::{MONTHLY_SHEET_LABEL, YEARLY_SHEET_LABEL};
    use crate::models::FeedAmount;

    fn ponds(n: i64) -> Vec<PondColumn> {
        (1..=n)
            .map(|i| PondColumn::new(PondId::new(i), format!("บ่อ {}", i)))
            .collect()
    }

    fn metadata(period: FeedPeriod) -> LedgerMetadata {
        LedgerMetadata {
            collection_id: FeedCollectionId::new(7),
            collection_name: "อาหารกุ้ง".into(),
            farm_name: "ฟาร์มบางปะกง".into(),
            period,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn c(row: u32, column: u32) -> GridCoordinate {
        GridCoordinate::new(row, column)
    }

    #[test]
    fn test_january_two_pond_example() {
        let ponds = ponds(2);
        let period = FeedPeriod::monthly(2021, 1).unwrap();
        let mut amounts = AmountMap::new();
        amounts.insert((PondId::new(1), date(2021, 1, 1)), FeedAmount::from_units(10).unwrap());
        amounts.insert((PondId::new(2), date(2021, 1, 1)), FeedAmount::from_units(5).unwrap());

        let doc = DocumentBuilder::new(&ponds, "บ่อ").build(&metadata(period), &amounts).unwrap();

        assert_eq!(doc.sheet_label(), MONTHLY_SHEET_LABEL);
        // Day-row 1 is sheet row 3
        assert_eq!(doc.value(c(3, 3)), &CellValue::Number(10.0));
        assert_eq!(doc.value(c(3, 4)), &CellValue::Number(5.0));
        assert_eq!(doc.evaluate(c(3, 5)), Some(15.0));
        assert_eq!(doc.value(c(3, 5)).as_number(), Some(15.0));

        // January has 31 day-rows, so the total row is 34
        assert_eq!(doc.text(c(34, 2)), Some("รวม มกราคม"));
        assert_eq!(doc.value(c(34, 3)).as_number(), Some(10.0));
        assert_eq!(doc.value(c(34, 4)).as_number(), Some(5.0));
        assert_eq!(doc.value(c(34, 5)).as_number(), Some(15.0));
        assert_eq!(
            doc.value(c(34, 5)),
            &CellValue::Formula {
                expression: "SUM(E3:E33)".into(),
                result: Some(15.0)
            }
        );
    }

    #[test]
    fn test_metadata_and_headers() {
        let ponds = ponds(2);
        let period = FeedPeriod::monthly(2024, 2).unwrap();
        let doc = DocumentBuilder::new(&ponds, "บ่อ").build(&metadata(period), &AmountMap::new()).unwrap();

        assert_eq!(doc.value(c(1, 1)).as_number(), Some(7.0));
        assert_eq!(doc.text(c(1, 2)), Some("อาหารกุ้ง"));
        assert_eq!(doc.text(c(1, 3)), Some("ฟาร์มบางปะกง"));
        assert_eq!(doc.value(c(1, 4)).as_number(), Some(2567.0));

        assert_eq!(doc.text(c(2, 3)), Some("1"));
        assert_eq!(doc.text(c(2, 4)), Some("2"));
        assert_eq!(doc.text(c(2, 5)), Some(TOTAL_MARKER));

        assert_eq!(doc.text(c(3, 1)), Some("กุมภาพันธ์"));
        assert_eq!(doc.text(c(3, 2)), Some("1 ก.พ. 2567"));
        assert_eq!(doc.text(c(31, 2)), Some("29 ก.พ. 2567"));
        assert_eq!(doc.text(c(32, 2)), Some("รวม กุมภาพันธ์"));
        assert_eq!(doc.merges().len(), 1);
        assert_eq!(doc.merges()[0].last, c(31, 1));
    }

    #[test]
    fn test_every_data_row_spans_pond_count_plus_three() {
        for n in [0, 1, 4] {
            let ponds = ponds(n);
            let period = FeedPeriod::yearly(2023).unwrap();
            let doc =
                DocumentBuilder::new(&ponds, "บ่อ").build(&metadata(period), &AmountMap::new()).unwrap();
            let plan = LayoutPlan::new(period, ponds.len());
            for block in &plan.blocks {
                for row in block.first_day_row..=block.total_row {
                    assert_eq!(doc.used_columns(row), n as u32 + 3, "row {}", row);
                }
            }
            let year_total = plan.period_total_row.unwrap();
            assert_eq!(doc.used_columns(year_total), n as u32 + 3);
        }
    }

    #[test]
    fn test_yearly_document_totals_per_month() {
        let ponds = ponds(1);
        let period = FeedPeriod::yearly(2024).unwrap();
        let mut amounts = AmountMap::new();
        amounts.insert((PondId::new(1), date(2024, 2, 29)), FeedAmount::from_units(3).unwrap());
        amounts.insert((PondId::new(1), date(2024, 3, 1)), FeedAmount::from_units(4).unwrap());
        // Outside the period: ignored
        amounts.insert((PondId::new(1), date(2025, 1, 1)), FeedAmount::from_units(99).unwrap());

        let doc = DocumentBuilder::new(&ponds, "บ่อ").build(&metadata(period), &amounts).unwrap();
        let plan = LayoutPlan::new(period, 1);

        assert_eq!(doc.sheet_label(), YEARLY_SHEET_LABEL);
        let feb = plan.blocks[1];
        let mar = plan.blocks[2];
        assert_eq!(doc.value(c(feb.total_row, 3)).as_number(), Some(3.0));
        assert_eq!(doc.value(c(mar.total_row, 4)).as_number(), Some(4.0));
        assert_eq!(doc.value(c(plan.blocks[0].total_row, 4)).as_number(), Some(0.0));
        assert_eq!(doc.max_row(), plan.last_row());
    }

    #[test]
    fn test_day_striping_alternates() {
        let ponds = ponds(1);
        let period = FeedPeriod::monthly(2023, 6).unwrap();
        let doc = DocumentBuilder::new(&ponds, "").build(&metadata(period), &AmountMap::new()).unwrap();
        assert_eq!(doc.get(c(3, 2)).unwrap().style, CellStyle::DayOdd);
        assert_eq!(doc.get(c(4, 2)).unwrap().style, CellStyle::DayEven);
        // Without a prefix the pond name is kept whole
        assert_eq!(doc.text(c(2, 3)), Some("บ่อ 1"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let ponds = ponds(3);
        let period = FeedPeriod::yearly(2022).unwrap();
        let mut amounts = AmountMap::new();
        for day in 1..=20 {
            amounts.insert(
                (PondId::new(day % 3 + 1), date(2022, 5, day as u32)),
                FeedAmount::from_hundredths(day * 125).unwrap(),
            );
        }
        let builder = DocumentBuilder::new(&ponds, "บ่อ");
        let first = builder.build(&metadata(period), &amounts).unwrap().to_bytes().unwrap();
        let second = builder.build(&metadata(period), &amounts).unwrap().to_bytes().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_yearly_grand_total_row() {
        let ponds = ponds(2);
        let period = FeedPeriod::yearly(2024).unwrap();
        let mut amounts = AmountMap::new();
        amounts.insert((PondId::new(1), date(2024, 1, 5)), FeedAmount::from_units(10).unwrap());
        amounts.insert((PondId::new(1), date(2024, 2, 29)), FeedAmount::from_hundredths(250).unwrap());
        amounts.insert((PondId::new(2), date(2024, 12, 31)), FeedAmount::from_units(7).unwrap());

        let doc = DocumentBuilder::new(&ponds, "บ่อ").build(&metadata(period), &amounts).unwrap();
        let plan = LayoutPlan::new(period, 2);
        let row = plan.period_total_row.unwrap();

        assert_eq!(row, plan.blocks[11].total_row + 1);
        assert_eq!(doc.text(c(row, 2)), Some(PERIOD_TOTAL_LABEL));
        assert_eq!(doc.value(c(row, 3)).as_number(), Some(12.5));
        assert_eq!(doc.value(c(row, 4)).as_number(), Some(7.0));
        assert_eq!(doc.value(c(row, 5)).as_number(), Some(19.5));
        assert_eq!(doc.get(c(row, 5)).unwrap().style, CellStyle::Total);
        let first_totals = format!("SUM(E{},E{},", plan.blocks[0].total_row, plan.blocks[1].total_row);
        match doc.value(c(row, 5)) {
            CellValue::Formula { expression, .. } => assert!(expression.starts_with(&first_totals)),
            other => panic!("expected a formula, found {:?}", other),
        }
    }

    #[test]
    fn test_monthly_sheet_has_no_grand_total() {
        let ponds = ponds(1);
        let period = FeedPeriod::monthly(2021, 1).unwrap();
        let doc = DocumentBuilder::new(&ponds, "บ่อ").build(&metadata(period), &AmountMap::new()).unwrap();
        assert_eq!(doc.max_row(), 34);
        assert_eq!(doc.text(c(35, 2)), None);
    }

    #[test]
    fn test_year_outside_calendar_is_rejected() {
        let ponds = ponds(1);
        let period = FeedPeriod {
            year: 300_000,
            month: Some(1),
        };
        let mut amounts = AmountMap::new();
        amounts.insert((PondId::new(1), date(2021, 1, 1)), FeedAmount::from_units(1).unwrap());
        let err = DocumentBuilder::new(&ponds, "บ่อ")
            .build(&metadata(period), &amounts)
            .unwrap_err();
        assert!(err.is_validation());
    }
}
