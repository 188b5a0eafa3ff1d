//! Export-then-import properties of the grid codec

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use feed_ledger::grid::{xlsx, AmountMap, DocumentBuilder, DocumentParser, LedgerMetadata};
use feed_ledger::models::{FeedAmount, FeedCollectionId, FeedPeriod, PondColumn, PondId};

const PREFIX: &str = "บ่อ";

fn ponds(count: usize) -> Vec<PondColumn> {
    (0..count)
        .map(|i| PondColumn::new(PondId::new(100 + i as i64), format!("บ่อ {}", i + 1)))
        .collect()
}

fn metadata(period: FeedPeriod) -> LedgerMetadata {
    LedgerMetadata {
        collection_id: FeedCollectionId::new(7),
        collection_name: "อาหารกุ้ง".into(),
        farm_name: "ฟาร์มทดสอบ".into(),
        period,
    }
}

/// (pond index, day of year offset, hundredths)
fn cells() -> impl Strategy<Value = Vec<(usize, u32, i64)>> {
    prop::collection::vec((0usize..4, 0u32..366, 0i64..1_000_000), 0..40)
}

fn amounts_for(
    ponds: &[PondColumn],
    period: FeedPeriod,
    cells: &[(usize, u32, i64)],
) -> AmountMap {
    let start = period.start_date().unwrap();
    let end = period.end_date().unwrap();
    let span = (end - start).num_days() as u32 + 1;

    let mut amounts = HashMap::new();
    for &(pond, offset, hundredths) in cells {
        if ponds.is_empty() {
            break;
        }
        let pond = &ponds[pond % ponds.len()];
        let date = start + chrono::Duration::days(i64::from(offset % span));
        amounts.insert(
            (pond.pond_id, date),
            FeedAmount::from_hundredths(hundredths).unwrap(),
        );
    }
    amounts
}

fn period_strategy() -> impl Strategy<Value = FeedPeriod> {
    prop_oneof![
        (1990i32..2100, 1u32..=12).prop_map(|(y, m)| FeedPeriod::monthly(y, m).unwrap()),
        (1990i32..2100).prop_map(|y| FeedPeriod::yearly(y).unwrap()),
    ]
}

proptest! {
    #[test]
    fn parse_recovers_built_amounts(
        pond_count in 0usize..5,
        period in period_strategy(),
        cells in cells(),
    ) {
        let ponds = ponds(pond_count);
        let amounts = amounts_for(&ponds, period, &cells);

        let doc = DocumentBuilder::new(&ponds, PREFIX).build(&metadata(period), &amounts).unwrap();
        let parsed = DocumentParser::new(&ponds, FeedCollectionId::new(7), PREFIX)
            .parse(&doc)
            .unwrap();

        prop_assert_eq!(parsed.period, period);
        prop_assert_eq!(parsed.farm_name, "ฟาร์มทดสอบ");
        let recovered: AmountMap = parsed
            .records
            .iter()
            .map(|r| ((r.pond_id, r.date), r.amount))
            .collect();
        prop_assert_eq!(recovered, amounts);
        prop_assert!(parsed
            .records
            .iter()
            .all(|r| r.feed_collection_id == FeedCollectionId::new(7)));
    }

    #[test]
    fn rebuilding_parsed_records_is_idempotent(
        pond_count in 1usize..4,
        period in period_strategy(),
        cells in cells(),
    ) {
        let ponds = ponds(pond_count);
        let amounts = amounts_for(&ponds, period, &cells);
        let builder = DocumentBuilder::new(&ponds, PREFIX);

        let first = builder.build(&metadata(period), &amounts).unwrap();
        let parsed = DocumentParser::new(&ponds, FeedCollectionId::new(7), PREFIX)
            .parse(&first)
            .unwrap();
        let again: AmountMap = parsed
            .records
            .into_iter()
            .map(|r| ((r.pond_id, r.date), r.amount))
            .collect();
        let second = builder.build(&metadata(period), &again).unwrap();

        prop_assert_eq!(first.to_bytes().unwrap(), second.to_bytes().unwrap());
    }
}

#[test]
fn xlsx_file_round_trip_keeps_amounts() {
    let ponds = ponds(3);
    let period = FeedPeriod::monthly(2024, 2).unwrap();
    let leap_day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let mut amounts = HashMap::new();
    amounts.insert((ponds[0].pond_id, leap_day), FeedAmount::from_hundredths(1250).unwrap());
    amounts.insert(
        (ponds[2].pond_id, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
        FeedAmount::from_units(3).unwrap(),
    );

    let doc = DocumentBuilder::new(&ponds, PREFIX).build(&metadata(period), &amounts).unwrap();
    let bytes = xlsx::to_xlsx_bytes(&doc).unwrap();
    let back = xlsx::from_xlsx_bytes(&bytes).unwrap();

    let parsed = DocumentParser::new(&ponds, FeedCollectionId::new(7), PREFIX)
        .parse(&back)
        .unwrap();
    assert_eq!(parsed.records.len(), 2);
    let leap = parsed
        .records
        .iter()
        .find(|r| r.date.day() == 29)
        .unwrap();
    assert_eq!(leap.amount, FeedAmount::from_hundredths(1250).unwrap());
}
