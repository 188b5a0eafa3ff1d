//! CLI command for feed ledger export
//!
//! Writes one collection's ledger for a farm and period to an `.xlsx` file.

use std::path::PathBuf;

use clap::Args;

use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::FeedPeriod;
use crate::services::{DirectoryService, ExportService};
use crate::storage::Storage;

/// Arguments of `feedledger export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Feed collection name or ID
    #[arg(short, long)]
    pub collection: String,

    /// Farm name or ID
    #[arg(short, long)]
    pub farm: String,

    /// Period: YYYY-MM for a month, YYYY for a whole year (Gregorian)
    #[arg(short, long)]
    pub period: String,

    /// Output file path (default: <farm>-<period>.xlsx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Parse a period argument
pub fn parse_period(period: &str) -> LedgerResult<FeedPeriod> {
    FeedPeriod::parse(period).map_err(|e| {
        LedgerError::Validation(format!(
            "{}. Use YYYY-MM for a month or YYYY for a year",
            e
        ))
    })
}

/// Handle the export command
pub fn handle_export_command(storage: &Storage, settings: &Settings, args: ExportArgs) -> LedgerResult<()> {
    let directory = DirectoryService::new(storage, settings);
    let collection = directory.resolve_collection(&args.collection)?;
    let farm = directory.resolve_farm(&args.farm)?;
    let period = parse_period(&args.period)?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}-{}.xlsx", farm.id, period)));

    let summary = ExportService::new(storage, settings).export_to_file(
        collection.id,
        farm.id,
        period,
        &output,
    )?;

    println!(
        "Exported {} for {} ({}) to: {}",
        collection.name,
        farm.name,
        summary.period,
        summary.path.display()
    );
    println!("  Ponds:   {}", summary.ponds);
    println!("  Amounts: {}", summary.amounts);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period_arguments() {
        assert_eq!(parse_period("2021-01").unwrap(), FeedPeriod::monthly(2021, 1).unwrap());
        assert_eq!(parse_period("2021").unwrap(), FeedPeriod::yearly(2021).unwrap());
        assert!(parse_period("2021-13").unwrap_err().is_validation());
        assert!(parse_period("jan").unwrap_err().is_validation());
        assert!(parse_period("2147483647").unwrap_err().is_validation());
    }
}
