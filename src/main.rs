use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use finnest::cli::{
    handle_asset_command, handle_contact_command, handle_doc_command, handle_fx_command,
    handle_insights_command, handle_insurance_command, handle_liability_command,
    handle_share_command,
};
use finnest::config::{paths::FinnestPaths, settings::Settings};
use finnest::server::{self, AppState};
use finnest::storage::Storage;

#[derive(Parser)]
#[command(
    name = "finnest",
    version,
    about = "Family finance vault: encrypted documents, FX comparison, share links",
    long_about = "FinNest keeps a household's important documents in a local vault, \
                  encrypting them with a passphrase before they are stored. It also \
                  compares exchange rates across public providers, totals assets \
                  across currencies, and creates read-only share links."
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Document vault commands
    #[command(subcommand)]
    Doc(finnest::cli::DocCommands),

    /// Exchange rate commands
    #[command(subcommand)]
    Fx(finnest::cli::FxCommands),

    /// Asset commands
    #[command(subcommand)]
    Asset(finnest::cli::AssetCommands),

    /// Liability commands
    #[command(subcommand)]
    Liability(finnest::cli::LiabilityCommands),

    /// Emergency contact commands
    #[command(subcommand)]
    Contact(finnest::cli::ContactCommands),

    /// Insurance policy commands
    #[command(subcommand)]
    Insurance(finnest::cli::InsuranceCommands),

    /// Share link commands
    #[command(subcommand)]
    Share(finnest::cli::ShareCommands),

    /// Observations about the portfolio
    Insights {
        /// Read the snapshot from a JSON file instead of the vault
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Run the HTTP API
    Serve {
        /// Address to bind (defaults to the configured address)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let paths = FinnestPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Doc(cmd)) => {
            handle_doc_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Fx(cmd)) => {
            handle_fx_command(&storage, &settings, cmd).await?;
        }
        Some(Commands::Asset(cmd)) => {
            handle_asset_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Liability(cmd)) => {
            handle_liability_command(&storage, cmd)?;
        }
        Some(Commands::Contact(cmd)) => {
            handle_contact_command(&storage, cmd)?;
        }
        Some(Commands::Insurance(cmd)) => {
            handle_insurance_command(&storage, cmd)?;
        }
        Some(Commands::Share(cmd)) => {
            handle_share_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Insights { file }) => {
            handle_insights_command(&storage, &settings, file.as_deref()).await?;
        }
        Some(Commands::Serve { bind }) => {
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            let state = AppState::from_settings(Arc::new(storage), &settings)?;
            println!("Serving FinNest API on http://{}", bind);
            server::serve(state, &bind).await?;
        }
        Some(Commands::Audit { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No audit entries yet.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Init) => {
            println!("Initializing FinNest at: {}", paths.base_dir().display());
            storage.save_all()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  finnest asset add \"Home\" --type property --currency AUD --value 850000");
            println!("  finnest doc upload will.pdf --encrypt");
            println!("  finnest fx compare AUD USD");
        }
        Some(Commands::Config) => {
            println!("FinNest Configuration");
            println!("=====================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Blob directory:   {}", paths.blob_dir().display());
            println!();
            println!("Settings:");
            println!("  Display currency:   {}", settings.display_currency);
            println!(
                "  Passphrase minimum: {} characters",
                settings.encryption.min_passphrase_len
            );
            println!("  Key derivation:     {}", settings.encryption.kdf.describe());
            println!(
                "  OpenExchangeRates:  {}",
                if settings.fx.resolved_app_id().is_some() {
                    "configured"
                } else {
                    "not configured"
                }
            );
            println!("  Insights model:     {}", settings.insights.model);
            println!("  Share links:        {}/share/<token>", settings.server.public_url);
        }
        None => {
            println!("FinNest - family finance vault");
            println!();
            println!("Run 'finnest --help' for usage information.");
        }
    }

    Ok(())
}
