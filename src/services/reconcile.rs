//! Bulk reconciler
//!
//! Splits a batch of ledger entries into creates (sentinel id) and updates
//! (real id) and applies both inside one unit of work, so a failure in either
//! leaves the ledger untouched.

use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::error::LedgerResult;
use crate::models::{LedgerEntry, LedgerEntryId};
use crate::storage::LedgerStore;

/// Outcome of a committed batch
#[derive(Debug, Clone)]
pub struct ReconcileSummary {
    /// Ids assigned to the created entries, in input order
    pub created: Vec<LedgerEntryId>,
    /// Number of entries overwritten
    pub updated: usize,
    /// Shared by every audit entry of this batch
    pub batch_id: Uuid,
}

/// Applies create/update batches to a ledger store
pub struct BulkReconciler<'a> {
    store: &'a dyn LedgerStore,
    audit: Option<&'a AuditLogger>,
}

impl<'a> BulkReconciler<'a> {
    pub fn new(store: &'a dyn LedgerStore, audit: Option<&'a AuditLogger>) -> Self {
        Self { store, audit }
    }

    /// Apply `entries` as one atomic batch on behalf of `actor`
    ///
    /// Store errors are returned as-is; nothing is retried. Audit entries are
    /// written only after the batch committed.
    pub fn reconcile(&self, entries: Vec<LedgerEntry>, actor: &str) -> LedgerResult<ReconcileSummary> {
        let batch_id = Uuid::new_v4();
        let (mut creates, mut updates): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(LedgerEntry::is_unsaved);

        if creates.is_empty() && updates.is_empty() {
            return Ok(ReconcileSummary {
                created: Vec::new(),
                updated: 0,
                batch_id,
            });
        }

        for entry in creates.iter_mut().chain(updates.iter_mut()) {
            entry.touch(actor);
        }

        let mut created = Vec::new();
        let mut replaced = Vec::new();
        let result = self.store.unit_of_work(&mut |batch| {
            created = batch.bulk_create(&creates)?;
            replaced = batch.bulk_update(&updates)?;
            Ok(())
        });
        if let Err(e) = result {
            warn!(
                %batch_id,
                creates = creates.len(),
                updates = updates.len(),
                error = %e,
                "ledger batch rolled back"
            );
            return Err(e);
        }

        info!(
            %batch_id,
            created = created.len(),
            updated = updates.len(),
            actor,
            "ledger batch committed"
        );

        for (entry, id) in creates.iter_mut().zip(&created) {
            entry.id = *id;
        }
        self.write_audit(batch_id, actor, &creates, &replaced, &updates);

        Ok(ReconcileSummary {
            created,
            updated: updates.len(),
            batch_id,
        })
    }

    /// The batch is already committed, so audit failures are only logged
    fn write_audit(
        &self,
        batch_id: Uuid,
        actor: &str,
        created: &[LedgerEntry],
        before: &[LedgerEntry],
        after: &[LedgerEntry],
    ) {
        let Some(logger) = self.audit else {
            return;
        };

        let creates = created.iter().map(|entry| {
            AuditEntry::create(
                EntityType::LedgerEntry,
                entry.id.to_string(),
                Some(describe(entry)),
                actor,
                entry,
            )
        });
        let updates = before.iter().zip(after).map(|(old, new)| {
            AuditEntry::update(
                EntityType::LedgerEntry,
                new.id.to_string(),
                Some(describe(new)),
                actor,
                old,
                new,
            )
        });
        let entries: Vec<AuditEntry> = creates
            .chain(updates)
            .map(|entry| entry.in_batch(batch_id))
            .collect();

        if let Err(e) = logger.log_batch(&entries) {
            warn!(%batch_id, error = %e, "failed to write audit entries");
        }
    }
}

fn describe(entry: &LedgerEntry) -> String {
    format!("{} {}", entry.record.pond_id, entry.record.date)
}
