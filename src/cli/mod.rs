//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod asset;
pub mod doc;
pub mod fx;
pub mod household;
pub mod insights;
pub mod passphrase;
pub mod share;

pub use asset::{handle_asset_command, AssetCommands};
pub use doc::{handle_doc_command, DocCommands};
pub use fx::{handle_fx_command, FxCommands};
pub use household::{
    handle_contact_command, handle_insurance_command, handle_liability_command, ContactCommands,
    InsuranceCommands, LiabilityCommands,
};
pub use insights::handle_insights_command;
pub use share::{handle_share_command, ShareCommands};
