//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod directory;
pub mod export;
pub mod import;

pub use audit::{handle_audit_command, AuditArgs};
pub use directory::{
    handle_collection_command, handle_farm_command, handle_pond_command, CollectionCommands,
    FarmCommands, PondCommands,
};
pub use export::{handle_export_command, ExportArgs};
pub use import::{handle_import_command, ImportArgs};
