//! Farm, pond and collection CLI commands
//!
//! Implements CLI commands for managing the directory that sheets are
//! exported for.

use clap::Subcommand;

use crate::config::Settings;
use crate::error::LedgerResult;
use crate::services::DirectoryService;
use crate::storage::Storage;

/// Farm subcommands
#[derive(Subcommand)]
pub enum FarmCommands {
    /// Create a new farm
    Add {
        /// Farm name
        name: String,
    },
    /// List all farms
    List,
    /// Show a farm's ponds in column order
    Show {
        /// Farm name or ID
        farm: String,
    },
}

/// Pond subcommands
#[derive(Subcommand)]
pub enum PondCommands {
    /// Append a pond to a farm
    Add {
        /// Farm name or ID
        farm: String,
        /// Pond name (e.g., "บ่อ 3")
        name: String,
    },
}

/// Feed collection subcommands
#[derive(Subcommand)]
pub enum CollectionCommands {
    /// Create a new feed collection
    Add {
        /// Collection name
        name: String,
    },
    /// List all feed collections
    List,
}

/// Handle a farm command
pub fn handle_farm_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: FarmCommands,
) -> LedgerResult<()> {
    let service = DirectoryService::new(storage, settings);

    match cmd {
        FarmCommands::Add { name } => {
            let farm = service.add_farm(&name, actor)?;
            println!("Created farm: {}", farm.name);
            println!("  ID: {}", farm.id);
        }

        FarmCommands::List => {
            let farms = service.list_farms()?;
            if farms.is_empty() {
                println!("No farms yet. Use 'feedledger farm add <name>' to create one.");
                return Ok(());
            }
            for farm in farms {
                println!("{:<10} {:<30} {} ponds", farm.id, farm.name, farm.ponds.len());
            }
        }

        FarmCommands::Show { farm } => {
            let farm = service.resolve_farm(&farm)?;
            println!("{} ({})", farm.name, farm.id);
            println!("{}", "=".repeat(40));
            if farm.ponds.is_empty() {
                println!("  No ponds");
            }
            for (index, pond) in farm.ponds.iter().enumerate() {
                println!(
                    "  {:>3}. {:<24} header '{}'",
                    index + 1,
                    pond.display_name,
                    pond.header_label(&settings.pond_name_prefix)
                );
            }
        }
    }

    Ok(())
}

/// Handle a pond command
pub fn handle_pond_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: PondCommands,
) -> LedgerResult<()> {
    let service = DirectoryService::new(storage, settings);

    match cmd {
        PondCommands::Add { farm, name } => {
            let farm = service.resolve_farm(&farm)?;
            let pond = service.add_pond(farm.id, &name, actor)?;
            println!("Added pond '{}' to {}", pond.display_name, farm.name);
            println!("  ID: {}", pond.pond_id);
            println!("Sheets exported for this farm before now will need to be exported again.");
        }
    }

    Ok(())
}

/// Handle a feed collection command
pub fn handle_collection_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: CollectionCommands,
) -> LedgerResult<()> {
    let service = DirectoryService::new(storage, settings);

    match cmd {
        CollectionCommands::Add { name } => {
            let collection = service.add_collection(&name, actor)?;
            println!("Created feed collection: {}", collection.name);
            println!("  ID: {}", collection.id);
        }

        CollectionCommands::List => {
            let collections = service.list_collections()?;
            if collections.is_empty() {
                println!("No feed collections yet.");
                return Ok(());
            }
            for collection in collections {
                println!("{:<10} {}", collection.id, collection.name);
            }
        }
    }

    Ok(())
}
