//! Storage layer for the feed ledger
//!
//! The grid codec and the services only talk to storage through the
//! collaborator traits below. `LedgerRepository` and `DirectoryRepository`
//! are JSON file implementations with atomic writes.

pub mod directory;
pub mod file_io;
pub mod ledger;

pub use directory::DirectoryRepository;
pub use file_io::{read_json, write_bytes_atomic, write_json_atomic};
pub use ledger::LedgerRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::LedgerPaths;
use crate::error::LedgerResult;
use crate::grid::AmountMap;
use crate::models::{
    FarmId, FeedCollectionId, FeedPeriod, LedgerEntry, LedgerEntryId, PondColumn,
};

/// Recorded feed amounts for export
pub trait AmountSource {
    /// Amounts keyed by (pond, day) for one collection, farm and period
    fn fetch_amounts(
        &self,
        collection: FeedCollectionId,
        farm: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<AmountMap>;
}

/// Ordered pond columns of a farm
pub trait PondDirectory {
    fn list_pond_columns(&self, farm: FarmId) -> LedgerResult<Vec<PondColumn>>;
}

/// Writes staged inside one unit of work
pub trait LedgerBatch {
    /// Insert unsaved entries, returning their new ids in input order
    fn bulk_create(&mut self, entries: &[LedgerEntry]) -> LedgerResult<Vec<LedgerEntryId>>;

    /// Overwrite existing entries by id, returning the replaced versions
    fn bulk_update(&mut self, entries: &[LedgerEntry]) -> LedgerResult<Vec<LedgerEntry>>;
}

/// Persistent ledger of feed entries
pub trait LedgerStore {
    /// Whether any entry exists for the collection, farm and period
    fn exists_for_period(
        &self,
        collection: FeedCollectionId,
        farm: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<bool>;

    fn entries_for_period(
        &self,
        collection: FeedCollectionId,
        farm: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<Vec<LedgerEntry>>;

    /// Run `work` atomically: either every write it made is applied, or none
    fn unit_of_work(
        &self,
        work: &mut dyn FnMut(&mut dyn LedgerBatch) -> LedgerResult<()>,
    ) -> LedgerResult<()>;
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub directory: DirectoryRepository,
    pub ledger: LedgerRepository,
    audit: Option<AuditLogger>,
}

impl Storage {
    /// Create a new Storage instance with audit logging enabled
    pub fn new(paths: LedgerPaths) -> LedgerResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            directory: DirectoryRepository::new(paths.directory_file()),
            ledger: LedgerRepository::new(paths.ledger_file()),
            audit: Some(AuditLogger::new(paths.audit_log())),
            paths,
        })
    }

    /// Stop writing audit entries
    pub fn without_audit(mut self) -> Self {
        self.audit = None;
        self
    }

    /// The audit logger, if auditing is enabled
    pub fn audit(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }

    /// Audit a created entity
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        actor: &str,
        entity: &T,
    ) -> LedgerResult<()> {
        match &self.audit {
            Some(logger) => logger.log(&AuditEntry::create(
                entity_type,
                entity_id,
                entity_name,
                actor,
                entity,
            )),
            None => Ok(()),
        }
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> LedgerResult<()> {
        self.directory.load()?;
        self.ledger.load()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
