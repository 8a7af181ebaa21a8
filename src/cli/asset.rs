//! Asset CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_asset_list, format_portfolio_total};
use crate::error::FinnestResult;
use crate::services::{AssetService, NewAsset};
use crate::storage::Storage;

/// Asset subcommands
#[derive(Subcommand)]
pub enum AssetCommands {
    /// Track a new asset
    Add {
        /// Asset name
        name: String,
        /// Category (property, equity, cash, super, ...)
        #[arg(short = 't', long = "type", default_value = "other")]
        asset_type: String,
        /// Currency the value is in
        #[arg(short, long)]
        currency: String,
        /// Current value
        #[arg(short, long)]
        value: f64,
        /// Country the asset is held in
        #[arg(long)]
        country: Option<String>,
        #[arg(long, env = "FINNEST_OWNER", default_value = "me")]
        owner: String,
    },
    /// List assets
    List,
    /// Total all assets in one currency
    Total {
        /// Target currency (defaults to the display currency)
        #[arg(short, long)]
        currency: Option<String>,
    },
    /// Delete an asset
    Remove {
        /// Asset name or ID
        asset: String,
    },
}

/// Handle an asset command
pub fn handle_asset_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AssetCommands,
) -> FinnestResult<()> {
    let service = AssetService::new(storage);

    match cmd {
        AssetCommands::Add {
            name,
            asset_type,
            currency,
            value,
            country,
            owner,
        } => {
            let asset = service.add(NewAsset {
                owner_id: owner,
                name,
                asset_type,
                currency,
                current_value: value,
                country,
                notes: String::new(),
            })?;

            println!("Created asset: {}", asset.name);
            println!("  Type:  {}", asset.asset_type);
            println!("  Value: {:.2} {}", asset.current_value, asset.currency);
            println!("  ID:    {}", asset.id);
        }

        AssetCommands::List => {
            print!("{}", format_asset_list(&service.list()?));
        }

        AssetCommands::Total { currency } => {
            let currency = currency.unwrap_or_else(|| settings.display_currency.clone());
            let total = service.total_in(&currency)?;
            print!("{}", format_portfolio_total(&total));
        }

        AssetCommands::Remove { asset } => {
            let found = service.find(&asset)?;
            let removed = service.remove(found.id)?;
            println!("Removed asset: {}", removed.name);
        }
    }

    Ok(())
}
