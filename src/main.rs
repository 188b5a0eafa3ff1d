use anyhow::Result;
use clap::{Parser, Subcommand};

use feed_ledger::cli::{
    handle_audit_command, handle_collection_command, handle_export_command, handle_farm_command,
    handle_import_command, handle_pond_command,
};
use feed_ledger::config::{paths::LedgerPaths, settings::Settings};
use feed_ledger::logging;
use feed_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "feedledger",
    version,
    about = "Pond feed ledger with spreadsheet export and import",
    long_about = "feedledger keeps the daily feed given to each pond of a farm. \
                  A month or a year of it is exported as an .xlsx sheet that can be \
                  filled in by hand and imported back."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Name recorded in the audit log for changes made by this command
    #[arg(long, global = true, env = "FEED_LEDGER_ACTOR")]
    actor: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Farm management commands
    #[command(subcommand)]
    Farm(feed_ledger::cli::FarmCommands),

    /// Pond management commands
    #[command(subcommand)]
    Pond(feed_ledger::cli::PondCommands),

    /// Feed collection management commands
    #[command(subcommand)]
    Collection(feed_ledger::cli::CollectionCommands),

    /// Export a feed ledger sheet
    Export(feed_ledger::cli::ExportArgs),

    /// Import an edited feed ledger sheet
    Import(feed_ledger::cli::ImportArgs),

    /// Show recent audit log entries
    Audit(feed_ledger::cli::AuditArgs),

    /// Initialize a new feed ledger
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Initialize paths and settings
    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    if !settings.audit_enabled {
        storage = storage.without_audit();
    }
    storage.load_all()?;

    let actor = cli.actor.as_deref();
    match cli.command {
        Some(Commands::Farm(cmd)) => handle_farm_command(&storage, &settings, actor, cmd)?,
        Some(Commands::Pond(cmd)) => handle_pond_command(&storage, &settings, actor, cmd)?,
        Some(Commands::Collection(cmd)) => {
            handle_collection_command(&storage, &settings, actor, cmd)?
        }
        Some(Commands::Export(args)) => handle_export_command(&storage, &settings, args)?,
        Some(Commands::Import(args)) => handle_import_command(&storage, &settings, actor, args)?,
        Some(Commands::Audit(args)) => handle_audit_command(&storage, args)?,
        Some(Commands::Init) => {
            println!("Initializing feed ledger at: {}", paths.base_dir().display());
            storage.directory.save()?;
            storage.ledger.save()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  feedledger farm add <name>");
            println!("  feedledger pond add <farm> <pond>");
            println!("  feedledger collection add <name>");
        }
        Some(Commands::Config) => {
            println!("Feed Ledger Configuration");
            println!("=========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!("Initialized:    {}", if paths.is_initialized() { "yes" } else { "no" });
            println!();
            println!("Settings:");
            println!("  Pond name prefix: {}", settings.pond_name_prefix);
            println!("  Default actor:    {}", settings.default_actor);
            println!("  Audit enabled:    {}", settings.audit_enabled);
        }
        None => {
            println!("feedledger - pond feed ledger");
            println!();
            println!("Run 'feedledger --help' for usage information.");
        }
    }

    Ok(())
}
