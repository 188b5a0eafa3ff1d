//! Service layer for the feed ledger
//!
//! The service layer sits between the CLI and storage: it resolves farms and
//! collections, drives the grid codec and applies ledger batches atomically.

pub mod directory;
pub mod export;
pub mod import;
pub mod reconcile;

pub use directory::DirectoryService;
pub use export::{ExportService, ExportSummary};
pub use import::{ImportMode, ImportService, ImportSummary};
pub use reconcile::{BulkReconciler, ReconcileSummary};
