//! Core data models for the feed ledger
//!
//! This module contains the data structures of the feed-ledger domain:
//! farms and their ponds, feed collections, periods, amounts and ledger
//! entries.

pub mod amount;
pub mod farm;
pub mod ids;
pub mod period;
pub mod record;

pub use amount::{AmountParseError, FeedAmount};
pub use farm::{DirectoryValidationError, Farm, FeedCollection, PondColumn};
pub use ids::{FarmId, FeedCollectionId, LedgerEntryId, PondId};
pub use period::{FeedPeriod, PeriodKind, PeriodParseError};
pub use record::{FeedRecord, LedgerEntry, RecordKey};
