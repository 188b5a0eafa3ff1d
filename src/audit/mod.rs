//! Audit logging for the feed ledger
//!
//! Every committed write (directory additions and reconciled ledger batches)
//! is appended to `audit.log` as one JSON object per line, with the actor who
//! made it and before/after values.
//!
//! ```rust,ignore
//! use feed_ledger::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! let entry = AuditEntry::update(
//!     EntityType::LedgerEntry,
//!     entry.id.to_string(),
//!     None,
//!     "somchai",
//!     &before,
//!     &after,
//! )
//! .in_batch(batch_id);
//! logger.log(&entry)?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
