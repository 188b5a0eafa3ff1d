//! Feed Ledger - daily pond feed records kept as spreadsheets
//!
//! This library keeps the amount of feed given to each pond of an aquaculture
//! farm per day, per feed collection. A month or a whole year of it is
//! exported as an `.xlsx` grid (Thai month names, Buddhist-era years, one
//! column per pond) that farm staff fill in by hand and import back.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Farms, ponds, collections, periods, amounts and ledger entries
//! - `calendar`: Thai month names and display-year conversion
//! - `grid`: The sheet template, document builder, parser and xlsx codec
//! - `storage`: JSON file storage layer and the store traits
//! - `services`: Export, import and atomic batch reconciliation
//! - `audit`: Audit logging system
//! - `cli`: Command handlers for the `feedledger` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use feed_ledger::config::{paths::LedgerPaths, settings::Settings};
//! use feed_ledger::services::ExportService;
//! use feed_ledger::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ExportService::new(&storage, &settings)
//!     .export_to_file(collection, farm, period, "jan.xlsx".as_ref())?;
//! ```

pub mod audit;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod grid;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
