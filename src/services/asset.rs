//! Asset service
//!
//! Tracks holdings and totals them in a chosen currency through the local
//! rate table.

use serde::Serialize;

use crate::audit::EntityType;
use crate::error::{FinnestError, FinnestResult};
use crate::fx::convert;
use crate::models::{Asset, AssetId, CurrencyCode};
use crate::storage::Storage;

use super::fx::FxService;

/// Fields for a new asset
#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    pub owner_id: String,
    pub name: String,
    pub asset_type: String,
    pub currency: String,
    pub current_value: f64,
    pub country: Option<String>,
    pub notes: String,
}

/// An asset valued in the total's currency
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedAsset {
    pub asset: Asset,
    pub converted_value: f64,
}

/// Portfolio total in one currency
///
/// Assets without a usable rate are listed in `unconvertible` and left out of
/// `total`; they are never counted as zero.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioTotal {
    pub currency: CurrencyCode,
    pub total: f64,
    pub converted: Vec<ConvertedAsset>,
    pub unconvertible: Vec<Asset>,
}

/// Service for asset management
pub struct AssetService<'a> {
    storage: &'a Storage,
}

impl<'a> AssetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new asset
    pub fn add(&self, new: NewAsset) -> FinnestResult<Asset> {
        let mut asset = Asset::new(
            new.owner_id.trim(),
            new.name.trim(),
            new.asset_type.trim(),
            CurrencyCode::parse(&new.currency)?,
            new.current_value,
        );
        asset.country = new.country.filter(|c| !c.trim().is_empty());
        asset.notes = new.notes;
        asset.validate()?;

        self.storage.assets.upsert(asset.clone())?;
        self.storage.assets.save()?;
        self.storage.log_create(
            EntityType::Asset,
            asset.id.to_string(),
            Some(asset.name.clone()),
            &asset,
        )?;

        Ok(asset)
    }

    pub fn list(&self) -> FinnestResult<Vec<Asset>> {
        self.storage.assets.get_all()
    }

    /// Find an asset by ID or name
    pub fn find(&self, identifier: &str) -> FinnestResult<Asset> {
        self.storage.assets.resolve(identifier)
    }

    /// Delete an asset; documents linked to it are detached first
    pub fn remove(&self, id: AssetId) -> FinnestResult<Asset> {
        let asset = self
            .storage
            .assets
            .get(id)?
            .ok_or_else(|| FinnestError::asset_not_found(id.to_string()))?;

        for mut document in self.storage.documents.get_all()? {
            if document.asset_id == Some(id) {
                document.asset_id = None;
                self.storage.documents.upsert(document)?;
            }
        }
        self.storage.documents.save()?;

        self.storage.assets.delete(id)?;
        self.storage.assets.save()?;
        self.storage.log_delete(
            EntityType::Asset,
            asset.id.to_string(),
            Some(asset.name.clone()),
            &asset,
        )?;

        Ok(asset)
    }

    /// Total every asset in `currency`
    pub fn total_in(&self, currency: &str) -> FinnestResult<PortfolioTotal> {
        let currency = CurrencyCode::parse(currency)?;
        let table = FxService::new(self.storage).table()?;

        let mut total = PortfolioTotal {
            currency: currency.clone(),
            total: 0.0,
            converted: Vec::new(),
            unconvertible: Vec::new(),
        };

        for asset in self.list()? {
            match convert(
                asset.current_value,
                asset.currency.as_str(),
                currency.as_str(),
                &table,
            ) {
                Some(value) => {
                    total.total += value;
                    total.converted.push(ConvertedAsset {
                        asset,
                        converted_value: value,
                    });
                }
                None => total.unconvertible.push(asset),
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinnestPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::new(FinnestPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn new_asset(name: &str, currency: &str, value: f64) -> NewAsset {
        NewAsset {
            owner_id: "o".into(),
            name: name.into(),
            asset_type: "cash".into(),
            currency: currency.into(),
            current_value: value,
            ..Default::default()
        }
    }

    #[test]
    fn test_add_validates() {
        let (_temp, storage) = create_test_storage();
        let service = AssetService::new(&storage);

        assert!(service.add(new_asset("Savings", "aud", 10.0)).is_ok());
        assert!(service.add(new_asset("", "AUD", 10.0)).is_err());
        assert!(service.add(new_asset("Bad", "AUDX", 10.0)).is_err());
    }

    #[test]
    fn test_total_never_counts_unconvertible_as_zero() {
        let (_temp, storage) = create_test_storage();
        let service = AssetService::new(&storage);
        FxService::new(&storage).set_rate("USD", "AUD", 1.5).unwrap();

        service.add(new_asset("Home", "AUD", 100.0)).unwrap();
        service.add(new_asset("Brokerage", "USD", 100.0)).unwrap();
        service.add(new_asset("Yen cash", "JPY", 1000.0)).unwrap();

        let total = service.total_in("AUD").unwrap();
        assert!((total.total - 250.0).abs() < 1e-9);
        assert_eq!(total.converted.len(), 2);
        assert_eq!(total.unconvertible.len(), 1);
        assert_eq!(total.unconvertible[0].name, "Yen cash");
    }

    #[test]
    fn test_remove_detaches_documents() {
        let (_temp, storage) = create_test_storage();
        let service = AssetService::new(&storage);
        let asset = service.add(new_asset("Car", "AUD", 1.0)).unwrap();

        let doc = crate::models::Document {
            id: crate::models::DocumentId::new(),
            owner_id: "o".into(),
            asset_id: Some(asset.id),
            name: "rego.pdf".into(),
            path: "o/1-rego.pdf".into(),
            size: 1,
            content_type: None,
            created_at: chrono::Utc::now(),
        };
        let doc_id = doc.id;
        storage.documents.upsert(doc).unwrap();

        service.remove(asset.id).unwrap();
        assert_eq!(storage.documents.get(doc_id).unwrap().unwrap().asset_id, None);
        assert!(service.find("Car").unwrap_err().is_not_found());
    }
}
