//! Asset model
//!
//! A tracked holding (property, shares, cash, super, ...) valued in its own
//! currency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;
use super::ids::AssetId;
use crate::error::FinnestError;

/// A tracked asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier
    pub id: AssetId,

    /// Owner of the asset
    pub owner_id: String,

    /// Display name (e.g., "Bondi apartment")
    pub name: String,

    /// Free-form category such as "property" or "equity"
    #[serde(rename = "type")]
    pub asset_type: String,

    /// Country the asset is held in
    #[serde(default)]
    pub country: Option<String>,

    /// Currency the value is expressed in
    pub currency: CurrencyCode,

    /// Current value in `currency`
    pub current_value: f64,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Create a new asset
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        asset_type: impl Into<String>,
        currency: CurrencyCode,
        current_value: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AssetId::new(),
            owner_id: owner_id.into(),
            name: name.into(),
            asset_type: asset_type.into(),
            country: None,
            currency,
            current_value,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the asset
    pub fn validate(&self) -> Result<(), FinnestError> {
        if self.name.trim().is_empty() {
            return Err(FinnestError::Validation("Asset name cannot be empty".into()));
        }
        if !self.current_value.is_finite() {
            return Err(FinnestError::Validation(format!(
                "Asset value must be a number, got {}",
                self.current_value
            )));
        }
        Ok(())
    }
}

/// The read-only projection handed out through share links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedAsset {
    pub id: AssetId,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub currency: CurrencyCode,
    pub current_value: f64,
    pub country: Option<String>,
}

impl From<&Asset> for SharedAsset {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id,
            name: asset.name.clone(),
            asset_type: asset.asset_type.clone(),
            currency: asset.currency.clone(),
            current_value: asset.current_value,
            country: asset.country.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_asset_validates() {
        let asset = Asset::new("o", "Apartment", "property", CurrencyCode::parse("AUD").unwrap(), 850_000.0);
        assert!(asset.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let asset = Asset::new("o", "  ", "cash", CurrencyCode::parse("AUD").unwrap(), 1.0);
        assert!(asset.validate().is_err());
    }

    #[test]
    fn test_shared_projection_drops_notes_and_owner() {
        let mut asset = Asset::new("o", "Shares", "equity", CurrencyCode::parse("USD").unwrap(), 10.0);
        asset.notes = "broker login in safe".into();
        let json = serde_json::to_value(SharedAsset::from(&asset)).unwrap();
        assert!(json.get("notes").is_none());
        assert!(json.get("owner_id").is_none());
        assert_eq!(json["type"], "equity");
    }
}
