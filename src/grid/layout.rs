//! Grid layout planning
//!
//! Turns a period and a pond count into concrete row positions: one block per
//! month, each `days_in_month` day-rows long followed by a single total row.
//! A yearly sheet ends with one more row totalling the twelve month totals.

use chrono::NaiveDate;

use super::coord::GridCoordinate;
use super::template::{TemplateDescriptor, FIRST_DAY_ROW};
use crate::calendar::days_in_month;
use crate::models::{FeedPeriod, PeriodKind};

/// Rows occupied by one month of the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBlock {
    pub year: i32,
    pub month: u32,
    pub first_day_row: u32,
    pub last_day_row: u32,
    pub total_row: u32,
}

impl MonthBlock {
    /// Plan a block starting at `first_day_row`
    pub fn new(year: i32, month: u32, first_day_row: u32) -> Self {
        let days = days_in_month(year, month);
        let last_day_row = first_day_row + days - 1;
        Self {
            year,
            month,
            first_day_row,
            last_day_row,
            total_row: last_day_row + 1,
        }
    }

    pub fn days(&self) -> u32 {
        self.last_day_row - self.first_day_row + 1
    }

    /// (day of month, row) for every day-row of the block
    pub fn day_rows(&self) -> impl Iterator<Item = (u32, u32)> {
        let first = self.first_day_row;
        (first..=self.last_day_row).map(move |row| (row - first + 1, row))
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// Cell holding the merged month label
    pub fn label_cell(&self, column: u32) -> GridCoordinate {
        GridCoordinate::new(self.first_day_row, column)
    }

    /// First row after this block
    pub fn next_row(&self) -> u32 {
        self.total_row + 1
    }
}

/// Full coordinate plan for one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub period: FeedPeriod,
    pub template: TemplateDescriptor,
    pub blocks: Vec<MonthBlock>,
    /// Grand-total row of a yearly sheet
    pub period_total_row: Option<u32>,
}

impl LayoutPlan {
    /// Plan the sheet for a period and a number of pond columns
    ///
    /// Pure: the same inputs always give the same plan.
    pub fn new(period: FeedPeriod, pond_count: usize) -> Self {
        let mut cursor = FIRST_DAY_ROW;
        let blocks: Vec<MonthBlock> = period
            .months()
            .into_iter()
            .map(|month| {
                let block = MonthBlock::new(period.year, month, cursor);
                cursor = block.next_row();
                block
            })
            .collect();

        let period_total_row = match period.kind() {
            PeriodKind::Yearly => Some(cursor),
            PeriodKind::Monthly => None,
        };

        Self {
            period,
            template: TemplateDescriptor::new(pond_count),
            blocks,
            period_total_row,
        }
    }

    /// Last row used by the sheet
    pub fn last_row(&self) -> u32 {
        self.period_total_row
            .or_else(|| self.blocks.last().map(|b| b.total_row))
            .unwrap_or(FIRST_DAY_ROW - 1)
    }

    /// Total rows of every month block, in sheet order
    pub fn month_total_rows(&self) -> Vec<u32> {
        self.blocks.iter().map(|b| b.total_row).collect()
    }

    /// Total number of day-rows across all blocks
    pub fn day_row_count(&self) -> u32 {
        self.blocks.iter().map(MonthBlock::days).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_february_block() {
        let plan = LayoutPlan::new(FeedPeriod::monthly(2024, 2).unwrap(), 3);
        assert_eq!(plan.blocks.len(), 1);
        let block = plan.blocks[0];
        assert_eq!(block.days(), 29);
        assert_eq!(block.first_day_row, 3);
        assert_eq!(block.last_day_row, 31);
        assert_eq!(block.total_row, 32);
    }

    #[test]
    fn test_common_february_block() {
        let plan = LayoutPlan::new(FeedPeriod::monthly(2023, 2).unwrap(), 3);
        assert_eq!(plan.blocks[0].days(), 28);
        assert_eq!(plan.last_row(), 31);
    }

    #[test]
    fn test_yearly_blocks_are_contiguous() {
        let plan = LayoutPlan::new(FeedPeriod::yearly(2024).unwrap(), 2);
        assert_eq!(plan.blocks.len(), 12);
        assert_eq!(plan.day_row_count(), 366);

        let mut expected_start = FIRST_DAY_ROW;
        for (idx, block) in plan.blocks.iter().enumerate() {
            assert_eq!(block.month, idx as u32 + 1);
            assert_eq!(block.first_day_row, expected_start);
            assert_eq!(block.days(), days_in_month(2024, block.month));
            expected_start = block.total_row + 1;
        }
        // 366 day-rows, 12 month totals and the year total after the two header rows
        assert_eq!(plan.period_total_row, Some(2 + 366 + 12 + 1));
        assert_eq!(plan.last_row(), 2 + 366 + 12 + 1);
    }

    #[test]
    fn test_monthly_plan_has_no_period_total() {
        let plan = LayoutPlan::new(FeedPeriod::monthly(2021, 1).unwrap(), 2);
        assert_eq!(plan.period_total_row, None);
        assert_eq!(plan.last_row(), 34);
        assert_eq!(plan.month_total_rows(), vec![34]);
    }

    #[test]
    fn test_day_rows_restart_each_block() {
        let plan = LayoutPlan::new(FeedPeriod::yearly(2023).unwrap(), 1);
        let march = plan.blocks[2];
        let first = march.day_rows().next().unwrap();
        assert_eq!(first, (1, march.first_day_row));
        assert_eq!(march.day_rows().count(), 31);
    }

    #[test]
    fn test_yearly_month_totals() {
        let plan = LayoutPlan::new(FeedPeriod::yearly(2023).unwrap(), 1);
        // January: rows 3..=33, total 34; February 35..=62, total 63
        let totals = plan.month_total_rows();
        assert_eq!(totals.len(), 12);
        assert_eq!(&totals[..2], &[34, 63]);
        assert_eq!(plan.period_total_row, Some(totals[11] + 1));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let period = FeedPeriod::yearly(2020).unwrap();
        assert_eq!(LayoutPlan::new(period, 4), LayoutPlan::new(period, 4));
    }
}
