//! FX CLI commands
//!
//! Compare live provider rates and manage the local rate table.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_quotes, format_rate_list};
use crate::error::FinnestResult;
use crate::fx::FxAggregator;
use crate::services::FxService;
use crate::storage::Storage;

/// FX subcommands
#[derive(Subcommand)]
pub enum FxCommands {
    /// Ask every provider for a rate and rank the answers
    Compare {
        /// Base currency (e.g. AUD)
        base: String,
        /// Quote currency (e.g. USD)
        quote: String,
        /// Store the best available rate in the local table
        #[arg(long)]
        save: bool,
    },
    /// Set a rate in the local table
    Set {
        base: String,
        quote: String,
        /// 1 base = RATE quote
        rate: f64,
    },
    /// List stored rates
    Rates,
    /// Remove a stored rate
    Remove { base: String, quote: String },
    /// Convert an amount with the local table
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
}

/// Handle an FX command
pub async fn handle_fx_command(
    storage: &Storage,
    settings: &Settings,
    cmd: FxCommands,
) -> FinnestResult<()> {
    let service = FxService::new(storage);

    match cmd {
        FxCommands::Compare { base, quote, save } => {
            let base = base.to_uppercase();
            let quote = quote.to_uppercase();
            let aggregator = FxAggregator::from_settings(&settings.fx)?;
            let quotes = aggregator.compare(&base, &quote).await?;
            print!("{}", format_quotes(&base, &quote, &quotes));

            if save {
                match service.save_first_available(&base, &quote, &quotes)? {
                    Some((rate, provider)) => {
                        println!("Saved {} = {} (from {})", rate.pair_label(), rate.rate, provider)
                    }
                    None => println!("No provider returned a rate; nothing saved."),
                }
            }
        }

        FxCommands::Set { base, quote, rate } => {
            let saved = service.set_rate(&base, &quote, rate)?;
            println!("Set {} = {}", saved.pair_label(), saved.rate);
        }

        FxCommands::Rates => {
            print!("{}", format_rate_list(&service.list_rates()?));
        }

        FxCommands::Remove { base, quote } => {
            let removed = service.remove_rate(&base, &quote)?;
            println!("Removed {}", removed.pair_label());
        }

        FxCommands::Convert { amount, from, to } => {
            match service.convert(amount, &from, &to)? {
                Some(value) => println!(
                    "{:.2} {} = {:.2} {}",
                    amount,
                    from.to_uppercase(),
                    value,
                    to.to_uppercase()
                ),
                None => println!(
                    "No rate available for {} -> {}",
                    from.to_uppercase(),
                    to.to_uppercase()
                ),
            }
        }
    }

    Ok(())
}
