//! Share link repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{FinnestError, FinnestResult};
use crate::models::Share;

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ShareData {
    shares: Vec<Share>,
}

/// Repository for share links, keyed by token
pub struct ShareRepository {
    path: PathBuf,
    data: RwLock<HashMap<String, Share>>,
}

impl ShareRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> FinnestResult<()> {
        let file_data: ShareData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for share in file_data.shares {
            data.insert(share.token.clone(), share);
        }

        Ok(())
    }

    pub fn save(&self) -> FinnestResult<()> {
        let shares = self.get_all()?;
        write_json_atomic(&self.path, &ShareData { shares })
    }

    pub fn get(&self, token: &str) -> FinnestResult<Option<Share>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(token).cloned())
    }

    /// All shares, oldest first
    pub fn get_all(&self) -> FinnestResult<Vec<Share>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut shares: Vec<Share> = data.values().cloned().collect();
        shares.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.token.cmp(&b.token)));
        Ok(shares)
    }

    /// Insert a new share; tokens are never reused
    pub fn insert(&self, share: Share) -> FinnestResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if data.contains_key(&share.token) {
            return Err(FinnestError::Storage(format!(
                "Share token collision: {}",
                share.token
            )));
        }
        data.insert(share.token.clone(), share);
        Ok(())
    }

    pub fn delete(&self, token: &str) -> FinnestResult<Option<Share>> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SharePermissions, ShareTarget};
    use chrono::Utc;
    use tempfile::TempDir;

    fn share(token: &str) -> Share {
        Share {
            token: token.to_string(),
            target_type: ShareTarget::Advisor,
            target_id: None,
            asset_ids: Vec::new(),
            permissions: SharePermissions {
                view: true,
                download: false,
            },
            message: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_get_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shares.json");
        let repo = ShareRepository::new(path.clone());

        repo.insert(share("tok-1")).unwrap();
        repo.save().unwrap();

        let repo2 = ShareRepository::new(path);
        repo2.load().unwrap();
        assert!(repo2.get("tok-1").unwrap().is_some());
        assert!(repo2.get("tok-2").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ShareRepository::new(temp_dir.path().join("shares.json"));

        repo.insert(share("tok")).unwrap();
        assert!(repo.insert(share("tok")).is_err());
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ShareRepository::new(temp_dir.path().join("shares.json"));

        repo.insert(share("tok")).unwrap();
        assert!(repo.delete("tok").unwrap().is_some());
        assert!(repo.get_all().unwrap().is_empty());
    }
}
