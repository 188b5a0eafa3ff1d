//! Feed ledger import service
//!
//! Reads an edited XLSX grid, validates it against the farm's current pond
//! layout and hands the recovered records to the bulk reconciler.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::grid::template::{metadata_cell, FARM_NAME_COLUMN};
use crate::grid::{xlsx, DocumentParser, GridDocument};
use crate::models::{FarmId, FeedCollectionId, FeedPeriod, LedgerEntry};
use crate::services::BulkReconciler;
use crate::storage::{LedgerStore, PondDirectory, Storage};

/// How imported records relate to what is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// The period must have no entries yet; every record is created
    #[default]
    New,
    /// Records matching a stored entry overwrite it; the rest are created
    Amend,
}

/// Result of an import
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub period: FeedPeriod,
    /// Records found in the sheet
    pub records: usize,
    pub created: usize,
    pub updated: usize,
    /// Records in amend mode whose amount was already stored
    pub unchanged: usize,
    pub batch_id: Uuid,
}

/// Service for importing feed ledgers
pub struct ImportService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Import an `.xlsx` file
    pub fn import_file(
        &self,
        path: &Path,
        collection_id: FeedCollectionId,
        farm_id: FarmId,
        actor: Option<&str>,
        mode: ImportMode,
    ) -> LedgerResult<ImportSummary> {
        info!(path = %path.display(), ?mode, "importing feed ledger");
        let document = xlsx::read_xlsx(path)?;
        self.import_document(&document, collection_id, farm_id, actor, mode)
    }

    /// Validate a grid document and persist its records
    ///
    /// Nothing is written unless the whole document parses.
    pub fn import_document(
        &self,
        document: &GridDocument,
        collection_id: FeedCollectionId,
        farm_id: FarmId,
        actor: Option<&str>,
        mode: ImportMode,
    ) -> LedgerResult<ImportSummary> {
        let actor = actor.unwrap_or(&self.settings.default_actor);

        self.storage
            .directory
            .get_collection(collection_id)?
            .ok_or_else(|| LedgerError::collection_not_found(collection_id.to_string()))?;
        let farm = self
            .storage
            .directory
            .get_farm(farm_id)?
            .ok_or_else(|| LedgerError::farm_not_found(farm_id.to_string()))?;
        let ponds = self.storage.directory.list_pond_columns(farm_id)?;

        let parsed = DocumentParser::new(&ponds, collection_id, &self.settings.pond_name_prefix)
            .parse(document)?;
        if parsed.farm_name != farm.name.trim() {
            return Err(LedgerError::MalformedHeader {
                coordinate: metadata_cell(FARM_NAME_COLUMN),
                reason: format!(
                    "sheet is for farm '{}', expected '{}'",
                    parsed.farm_name, farm.name
                ),
            });
        }

        let period = parsed.period;
        let records = parsed.records.len();
        let (entries, unchanged) = match mode {
            ImportMode::New => {
                self.ensure_period_available(collection_id, farm_id, period)?;
                let entries = parsed
                    .records
                    .into_iter()
                    .map(|record| LedgerEntry::unsaved(farm_id, record))
                    .collect();
                (entries, 0)
            }
            ImportMode::Amend => {
                let stored: HashMap<_, _> = self
                    .storage
                    .ledger
                    .entries_for_period(collection_id, farm_id, period)?
                    .into_iter()
                    .map(|entry| (entry.record.key(), entry))
                    .collect();

                let mut unchanged = 0;
                let mut entries = Vec::new();
                for record in parsed.records {
                    match stored.get(&record.key()) {
                        Some(existing) if existing.record.amount == record.amount => unchanged += 1,
                        Some(existing) => {
                            entries.push(LedgerEntry::existing(existing.id, farm_id, record))
                        }
                        None => entries.push(LedgerEntry::unsaved(farm_id, record)),
                    }
                }
                (entries, unchanged)
            }
        };

        let summary = BulkReconciler::new(&self.storage.ledger, self.storage.audit())
            .reconcile(entries, actor)?;

        info!(
            period = %period,
            records,
            created = summary.created.len(),
            updated = summary.updated,
            unchanged,
            "feed ledger imported"
        );
        Ok(ImportSummary {
            period,
            records,
            created: summary.created.len(),
            updated: summary.updated,
            unchanged,
            batch_id: summary.batch_id,
        })
    }

    /// Fail with `PeriodAlreadyLedgered` when the period has entries
    ///
    /// Advisory only: concurrent imports of the same period are not
    /// serialized here.
    pub fn ensure_period_available(
        &self,
        collection_id: FeedCollectionId,
        farm_id: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<()> {
        let taken = self
            .storage
            .ledger
            .exists_for_period(collection_id, farm_id, period)?;
        debug!(period = %period, taken, "checked period availability");
        if taken {
            return Err(LedgerError::PeriodAlreadyLedgered {
                collection: collection_id.to_string(),
                farm: farm_id.to_string(),
                period: period.to_string(),
            });
        }
        Ok(())
    }
}
