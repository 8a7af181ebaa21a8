//! Share link CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::error::FinnestResult;
use crate::models::SharePermissions;
use crate::services::{CreateShareRequest, ShareService};
use crate::storage::Storage;

/// Share subcommands
#[derive(Subcommand)]
pub enum ShareCommands {
    /// Create a read-only link to some assets
    Create {
        /// Who the link is for: beneficiary or advisor
        #[arg(long, default_value = "beneficiary")]
        tab: String,
        /// Assets to include (names or IDs)
        #[arg(short, long, value_delimiter = ',')]
        assets: Vec<String>,
        /// Beneficiary reference
        #[arg(short, long)]
        beneficiary: Option<String>,
        /// Note shown with the share
        #[arg(short, long, default_value = "")]
        message: String,
        /// Allow document downloads
        #[arg(long)]
        download: bool,
    },
    /// Show what a token exposes
    Show { token: String },
    /// List shares
    List,
    /// Revoke a share
    Revoke { token: String },
}

/// Handle a share command
pub fn handle_share_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ShareCommands,
) -> FinnestResult<()> {
    let service = ShareService::new(storage, &settings.server.public_url);

    match cmd {
        ShareCommands::Create {
            tab,
            assets,
            beneficiary,
            message,
            download,
        } => {
            let created = service.create(CreateShareRequest {
                tab,
                beneficiary_id: beneficiary.map(serde_json::Value::String),
                assets,
                permissions: SharePermissions {
                    view: true,
                    download,
                },
                message,
            })?;

            println!("Created share");
            println!("  Token: {}", created.token);
            println!("  URL:   {}", created.url);
        }

        ShareCommands::Show { token } => {
            let view = service.resolve(&token)?;
            println!("Share for {}", view.share.target_type);
            if let Some(target) = &view.share.target_id {
                println!("  Target:  {}", target);
            }
            if !view.share.message.is_empty() {
                println!("  Message: {}", view.share.message);
            }
            println!(
                "  Download allowed: {}",
                if view.share.permissions.download { "yes" } else { "no" }
            );
            println!();

            if view.assets.is_empty() {
                println!("No assets shared.");
            }
            for asset in &view.assets {
                println!(
                    "  {}  {} ({})  {:.2} {}",
                    asset.id, asset.name, asset.asset_type, asset.current_value, asset.currency
                );
            }
        }

        ShareCommands::List => {
            let shares = service.list()?;
            if shares.is_empty() {
                println!("No shares found.");
            }
            for share in shares {
                println!(
                    "{}  {:<11}  {} asset(s)  {}",
                    share.token,
                    share.target_type.to_string(),
                    share.asset_ids.len(),
                    share.created_at.format("%Y-%m-%d")
                );
            }
        }

        ShareCommands::Revoke { token } => {
            service.revoke(&token)?;
            println!("Revoked share {}", token);
        }
    }

    Ok(())
}
