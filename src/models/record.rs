//! Feed record and ledger entry models
//!
//! A `FeedRecord` is one day's feed for one pond. A `LedgerEntry` is a record
//! as the store knows it: with an identifier (or the unsaved sentinel) and the
//! farm it was recorded for.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::amount::FeedAmount;
use super::ids::{FarmId, FeedCollectionId, LedgerEntryId, PondId};

/// Identity of a feed record: at most one amount per pond, collection and day
pub type RecordKey = (PondId, FeedCollectionId, NaiveDate);

/// Amount of feed given to a pond on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub pond_id: PondId,
    pub feed_collection_id: FeedCollectionId,
    pub amount: FeedAmount,
    pub date: NaiveDate,
}

impl FeedRecord {
    pub fn new(
        pond_id: PondId,
        feed_collection_id: FeedCollectionId,
        amount: FeedAmount,
        date: NaiveDate,
    ) -> Self {
        Self {
            pond_id,
            feed_collection_id,
            amount,
            date,
        }
    }

    pub fn key(&self) -> RecordKey {
        (self.pond_id, self.feed_collection_id, self.date)
    }
}

/// A feed record tagged for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Store identifier, or `LedgerEntryId::UNSAVED` for new entries
    pub id: LedgerEntryId,

    pub farm_id: FarmId,

    #[serde(flatten)]
    pub record: FeedRecord,

    /// Who last wrote this entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Wrap a record as a new, not yet persisted entry
    pub fn unsaved(farm_id: FarmId, record: FeedRecord) -> Self {
        Self {
            id: LedgerEntryId::UNSAVED,
            farm_id,
            record,
            recorded_by: None,
            updated_at: None,
        }
    }

    /// Wrap a record as a change to an existing entry
    pub fn existing(id: LedgerEntryId, farm_id: FarmId, record: FeedRecord) -> Self {
        Self {
            id,
            ..Self::unsaved(farm_id, record)
        }
    }

    pub fn is_unsaved(&self) -> bool {
        self.id.is_unsaved()
    }

    /// Stamp the writer and time of the change
    pub fn touch(&mut self, actor: &str) {
        self.recorded_by = Some(actor.to_string());
        self.updated_at = Some(Utc::now());
    }
}
