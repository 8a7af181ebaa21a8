//! Asset repository for JSON storage
//!
//! Manages loading and saving assets to assets.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{FinnestError, FinnestResult};
use crate::models::{Asset, AssetId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AssetData {
    assets: Vec<Asset>,
}

/// Repository for asset persistence
pub struct AssetRepository {
    path: PathBuf,
    data: RwLock<HashMap<AssetId, Asset>>,
}

impl AssetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> FinnestResult<()> {
        let file_data: AssetData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for asset in file_data.assets {
            data.insert(asset.id, asset);
        }

        Ok(())
    }

    pub fn save(&self) -> FinnestResult<()> {
        let assets = self.get_all()?;
        write_json_atomic(&self.path, &AssetData { assets })
    }

    pub fn get(&self, id: AssetId) -> FinnestResult<Option<Asset>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all assets sorted by name
    pub fn get_all(&self) -> FinnestResult<Vec<Asset>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut assets: Vec<Asset> = data.values().cloned().collect();
        assets.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(assets)
    }

    /// Fetch the listed assets in the given order, skipping unknown ids
    pub fn get_many(&self, ids: &[AssetId]) -> FinnestResult<Vec<Asset>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(ids.iter().filter_map(|id| data.get(id).cloned()).collect())
    }

    /// Find an asset by full ID, printed short ID, unambiguous prefix or exact name
    pub fn resolve(&self, identifier: &str) -> FinnestResult<Asset> {
        if let Ok(id) = identifier.parse::<AssetId>() {
            if let Some(asset) = self.get(id)? {
                return Ok(asset);
            }
        }

        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let name_lower = identifier.trim().to_lowercase();
        let mut matches: Vec<&Asset> = data
            .values()
            .filter(|a| a.id.matches_prefix(identifier))
            .collect();
        if matches.is_empty() {
            matches = data
                .values()
                .filter(|a| a.name.to_lowercase() == name_lower)
                .collect();
        }

        match matches.as_slice() {
            [asset] => Ok((*asset).clone()),
            [] => Err(FinnestError::asset_not_found(identifier)),
            _ => Err(FinnestError::Validation(format!(
                "Asset '{}' is ambiguous ({} matches)",
                identifier,
                matches.len()
            ))),
        }
    }

    pub fn upsert(&self, asset: Asset) -> FinnestResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(asset.id, asset);
        Ok(())
    }

    pub fn delete(&self, id: AssetId) -> FinnestResult<Option<Asset>> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id))
    }

    pub fn exists(&self, id: AssetId) -> FinnestResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CurrencyCode;
    use tempfile::TempDir;

    fn asset(name: &str) -> Asset {
        Asset::new("o", name, "property", CurrencyCode::parse("AUD").unwrap(), 100.0)
    }

    fn create_test_repo() -> (TempDir, AssetRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = AssetRepository::new(temp_dir.path().join("assets.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_save_and_reload() {
        let (temp, repo) = create_test_repo();
        let a = asset("Apartment");
        let id = a.id;
        repo.upsert(a).unwrap();
        repo.save().unwrap();

        let repo2 = AssetRepository::new(temp.path().join("assets.json"));
        repo2.load().unwrap();
        assert!(repo2.exists(id).unwrap());
    }

    #[test]
    fn test_get_many_skips_unknown() {
        let (_temp, repo) = create_test_repo();
        let a = asset("A");
        let b = asset("B");
        let (ida, idb) = (a.id, b.id);
        repo.upsert(a).unwrap();
        repo.upsert(b).unwrap();

        let got = repo.get_many(&[idb, AssetId::new(), ida]).unwrap();
        let names: Vec<&str> = got.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_resolve_by_name_or_id() {
        let (_temp, repo) = create_test_repo();
        let a = asset("Bondi Apartment");
        let short = a.id.to_string();
        repo.upsert(a).unwrap();

        assert_eq!(repo.resolve("bondi apartment").unwrap().name, "Bondi Apartment");
        assert_eq!(repo.resolve(&short).unwrap().name, "Bondi Apartment");
        assert!(repo.resolve("Cottage").unwrap_err().is_not_found());
    }
}
