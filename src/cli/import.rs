//! CLI command handler for feed ledger import
//!
//! Reads an edited `.xlsx` sheet back into the ledger. Any problem with the
//! sheet is reported with the cell it was found at and nothing is written.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::services::{DirectoryService, ImportMode, ImportService};
use crate::storage::Storage;

/// How the import treats a period that already has entries
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ModeArg {
    /// Refuse periods that already have entries
    #[default]
    New,
    /// Overwrite matching entries and add the rest
    Amend,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::New => ImportMode::New,
            ModeArg::Amend => ImportMode::Amend,
        }
    }
}

/// Arguments of `feedledger import`
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the .xlsx file
    pub file: PathBuf,

    /// Feed collection name or ID
    #[arg(short, long)]
    pub collection: String,

    /// Farm name or ID
    #[arg(short, long)]
    pub farm: String,

    /// Whether the period may already have entries
    #[arg(short, long, value_enum, default_value = "new")]
    pub mode: ModeArg,
}

/// Handle the import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    args: ImportArgs,
) -> LedgerResult<()> {
    if !args.file.exists() {
        return Err(LedgerError::Import(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let directory = DirectoryService::new(storage, settings);
    let collection = directory.resolve_collection(&args.collection)?;
    let farm = directory.resolve_farm(&args.farm)?;

    let summary = ImportService::new(storage, settings).import_file(
        &args.file,
        collection.id,
        farm.id,
        actor,
        args.mode.into(),
    )?;

    println!("Imported {} for {} ({})", collection.name, farm.name, summary.period);
    println!("{}", "=".repeat(40));
    println!("  Amounts in sheet: {}", summary.records);
    println!("  Created:          {}", summary.created);
    println!("  Updated:          {}", summary.updated);
    if summary.unchanged > 0 {
        println!("  Unchanged:        {}", summary.unchanged);
    }
    println!("  Batch:            {}", summary.batch_id);
    Ok(())
}
