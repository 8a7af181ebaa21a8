//! Core data models for FinNest
//!
//! This module contains the data structures of the vault and FX domain:
//! documents, assets, household records, share links, currency codes and
//! rates.

pub mod asset;
pub mod currency;
pub mod document;
pub mod fx;
pub mod household;
pub mod ids;
pub mod share;

pub use asset::{Asset, SharedAsset};
pub use currency::CurrencyCode;
pub use document::Document;
pub use fx::{FxRate, ProviderQuote};
pub use household::{EmergencyContact, InsurancePolicy, Liability};
pub use ids::{AssetId, ContactId, DocumentId, LiabilityId, PolicyId, UploadId};
pub use share::{Share, SharePermissions, ShareTarget};
