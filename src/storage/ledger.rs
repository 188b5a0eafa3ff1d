//! Ledger entry repository for JSON storage
//!
//! Manages loading and saving feed ledger entries to ledger.json. Writes go
//! through `unit_of_work`: changes are staged on a copy of the entries and
//! only swapped in once the whole batch succeeded and reached disk.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::grid::AmountMap;
use crate::models::{FarmId, FeedCollectionId, FeedPeriod, LedgerEntry, LedgerEntryId, RecordKey};

use super::file_io::{read_json, write_json_atomic};
use super::{AmountSource, LedgerBatch, LedgerStore};

/// Serializable ledger data structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerData {
    entries: Vec<LedgerEntry>,
}

/// In-memory entries plus the identity index
#[derive(Debug, Clone, Default)]
struct LedgerState {
    entries: BTreeMap<LedgerEntryId, LedgerEntry>,
    by_key: HashMap<RecordKey, LedgerEntryId>,
    next_id: i64,
}

impl LedgerState {
    fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        let mut state = Self::default();
        for entry in entries {
            state.by_key.insert(entry.record.key(), entry.id);
            state.entries.insert(entry.id, entry);
        }
        state.next_id = state.entries.keys().map(|id| id.get()).max().unwrap_or(0) + 1;
        state
    }

    fn matching<'a>(
        &'a self,
        collection: FeedCollectionId,
        farm: FarmId,
        period: FeedPeriod,
    ) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        self.entries.values().filter(move |e| {
            e.farm_id == farm
                && e.record.feed_collection_id == collection
                && period.contains(e.record.date)
        })
    }
}

/// A batch of writes against a staged copy of the ledger
struct StagedBatch<'a> {
    state: &'a mut LedgerState,
}

impl LedgerBatch for StagedBatch<'_> {
    fn bulk_create(&mut self, entries: &[LedgerEntry]) -> LedgerResult<Vec<LedgerEntryId>> {
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.is_unsaved() {
                return Err(LedgerError::Validation(format!(
                    "cannot create {}: entry already has an id",
                    entry.id
                )));
            }
            let key = entry.record.key();
            if self.state.by_key.contains_key(&key) {
                return Err(duplicate(&key));
            }

            let id = LedgerEntryId::new(self.state.next_id);
            self.state.next_id += 1;
            let mut stored = entry.clone();
            stored.id = id;
            self.state.by_key.insert(key, id);
            self.state.entries.insert(id, stored);
            ids.push(id);
        }
        Ok(ids)
    }

    fn bulk_update(&mut self, entries: &[LedgerEntry]) -> LedgerResult<Vec<LedgerEntry>> {
        let mut replaced = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.is_unsaved() {
                return Err(LedgerError::Validation(
                    "cannot update an entry that was never saved".into(),
                ));
            }
            let old_key = match self.state.entries.get(&entry.id) {
                Some(existing) => existing.record.key(),
                None => return Err(LedgerError::entry_not_found(entry.id.to_string())),
            };

            let key = entry.record.key();
            if key != old_key {
                if self.state.by_key.contains_key(&key) {
                    return Err(duplicate(&key));
                }
                self.state.by_key.remove(&old_key);
                self.state.by_key.insert(key, entry.id);
            }
            if let Some(previous) = self.state.entries.insert(entry.id, entry.clone()) {
                replaced.push(previous);
            }
        }
        Ok(replaced)
    }
}

fn duplicate(key: &RecordKey) -> LedgerError {
    let (pond, collection, date) = key;
    LedgerError::Duplicate {
        entity_type: "Ledger entry",
        identifier: format!("{} {} {}", pond, collection, date),
    }
}

/// Repository for feed ledger entries
pub struct LedgerRepository {
    path: PathBuf,
    state: RwLock<LedgerState>,
}

impl LedgerRepository {
    /// Create a new ledger repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: RwLock::new(LedgerState::from_entries(Vec::new())),
        }
    }

    /// Load entries from disk
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: LedgerData = read_json(&self.path)?;
        let mut state = self.state.write().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *state = LedgerState::from_entries(file_data.entries);
        Ok(())
    }

    /// Save entries to disk
    pub fn save(&self) -> LedgerResult<()> {
        let state = self.state.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        self.persist(&state)
    }

    fn persist(&self, state: &LedgerState) -> LedgerResult<()> {
        let file_data = LedgerData {
            entries: state.entries.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get an entry by ID
    pub fn get(&self, id: LedgerEntryId) -> LedgerResult<Option<LedgerEntry>> {
        let state = self.state.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(state.entries.get(&id).cloned())
    }

    /// Count entries
    pub fn count(&self) -> LedgerResult<usize> {
        let state = self.state.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(state.entries.len())
    }
}

impl AmountSource for LedgerRepository {
    fn fetch_amounts(
        &self,
        collection: FeedCollectionId,
        farm: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<AmountMap> {
        let state = self.state.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(state
            .matching(collection, farm, period)
            .map(|e| ((e.record.pond_id, e.record.date), e.record.amount))
            .collect())
    }
}

impl LedgerStore for LedgerRepository {
    fn exists_for_period(
        &self,
        collection: FeedCollectionId,
        farm: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<bool> {
        let state = self.state.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        let exists = state.matching(collection, farm, period).next().is_some();
        Ok(exists)
    }

    fn entries_for_period(
        &self,
        collection: FeedCollectionId,
        farm: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        let state = self.state.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(state.matching(collection, farm, period).cloned().collect())
    }

    fn unit_of_work(
        &self,
        work: &mut dyn FnMut(&mut dyn LedgerBatch) -> LedgerResult<()>,
    ) -> LedgerResult<()> {
        let mut state = self.state.write().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut staged = state.clone();
        let result = work(&mut StagedBatch {
            state: &mut staged,
        });
        if let Err(e) = result {
            debug!(error = %e, "ledger unit of work rolled back");
            return Err(e);
        }

        self.persist(&staged)?;
        *state = staged;
        Ok(())
    }
}
