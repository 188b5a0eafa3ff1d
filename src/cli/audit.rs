//! CLI command for reading the audit log

use clap::Args;

use crate::error::LedgerResult;
use crate::storage::Storage;

/// Arguments of `feedledger audit`
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Number of most recent entries to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

/// Print the most recent audit entries, oldest first
pub fn handle_audit_command(storage: &Storage, args: AuditArgs) -> LedgerResult<()> {
    let Some(logger) = storage.audit() else {
        println!("Audit logging is disabled (audit_enabled = false in settings).");
        return Ok(());
    };

    let entries = logger.read_recent(args.limit)?;
    if entries.is_empty() {
        println!("No audit entries yet.");
        return Ok(());
    }
    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
