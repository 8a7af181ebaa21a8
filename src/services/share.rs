//! Share link service
//!
//! Creates read-only links to a selection of assets and resolves them back
//! by token.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::audit::EntityType;
use crate::error::{FinnestError, FinnestResult};
use crate::models::{Share, SharePermissions, SharedAsset, ShareTarget};
use crate::storage::Storage;

/// Body of a share creation request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
    /// `beneficiary` or `advisor`
    #[serde(default)]
    pub tab: String,
    /// Beneficiary reference; a string or a number
    #[serde(default)]
    pub beneficiary_id: Option<Value>,
    /// Asset IDs (full or short) to expose
    #[serde(default)]
    pub assets: Vec<String>,
    #[serde(default)]
    pub permissions: SharePermissions,
    #[serde(default)]
    pub message: String,
}

/// A freshly created link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedShare {
    pub token: String,
    pub url: String,
}

/// What a token holder gets to see
#[derive(Debug, Clone, Serialize)]
pub struct SharedView {
    pub share: Share,
    pub assets: Vec<SharedAsset>,
}

/// Service for share links
pub struct ShareService<'a> {
    storage: &'a Storage,
    public_url: &'a str,
}

impl<'a> ShareService<'a> {
    /// `public_url` is the origin links are built on
    pub fn new(storage: &'a Storage, public_url: &'a str) -> Self {
        Self {
            storage,
            public_url,
        }
    }

    /// Create and persist a share link
    pub fn create(&self, request: CreateShareRequest) -> FinnestResult<CreatedShare> {
        let target_type = ShareTarget::parse(&request.tab).ok_or_else(|| {
            FinnestError::Validation(format!("Unknown share target: '{}'", request.tab))
        })?;

        let mut asset_ids = Vec::with_capacity(request.assets.len());
        for identifier in &request.assets {
            let id = self.storage.assets.resolve(identifier)?.id;
            if !asset_ids.contains(&id) {
                asset_ids.push(id);
            }
        }

        let target_id = match target_type {
            ShareTarget::Beneficiary => request.beneficiary_id.as_ref().and_then(id_string),
            ShareTarget::Advisor => None,
        };

        let share = Share {
            token: Uuid::new_v4().to_string(),
            target_type,
            target_id,
            asset_ids,
            permissions: request.permissions,
            message: request.message,
            created_at: Utc::now(),
        };

        self.storage.shares.insert(share.clone())?;
        if let Err(e) = self.storage.shares.save() {
            let _ = self.storage.shares.delete(&share.token);
            return Err(e);
        }
        self.storage
            .log_create(EntityType::Share, share.token.clone(), None, &share)?;

        Ok(CreatedShare {
            url: share_url(self.public_url, &share.token),
            token: share.token,
        })
    }

    /// Look a token up; assets deleted since the share was made are skipped
    pub fn resolve(&self, token: &str) -> FinnestResult<SharedView> {
        let share = self
            .storage
            .shares
            .get(token)?
            .ok_or_else(|| FinnestError::share_not_found(token))?;

        let assets = self
            .storage
            .assets
            .get_many(&share.asset_ids)?
            .iter()
            .map(SharedAsset::from)
            .collect();

        self.storage
            .log_access(EntityType::Share, token, None, "resolved")?;

        Ok(SharedView { share, assets })
    }

    pub fn list(&self) -> FinnestResult<Vec<Share>> {
        self.storage.shares.get_all()
    }

    /// Delete a share so its token stops resolving
    pub fn revoke(&self, token: &str) -> FinnestResult<Share> {
        let share = self
            .storage
            .shares
            .delete(token)?
            .ok_or_else(|| FinnestError::share_not_found(token))?;
        self.storage.shares.save()?;
        self.storage
            .log_delete(EntityType::Share, token, None, &share)?;
        Ok(share)
    }

    /// Public link for a token
    pub fn url_for(&self, token: &str) -> String {
        share_url(self.public_url, token)
    }
}

/// `{origin}/share/{token}`; origins without a scheme get `https://`
pub fn share_url(origin: &str, token: &str) -> String {
    let origin = origin.trim().trim_end_matches('/');
    if origin.starts_with("http") {
        format!("{}/share/{}", origin, token)
    } else {
        format!("https://{}/share/{}", origin, token)
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinnestPaths;
    use crate::models::{Asset, CurrencyCode};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::new(FinnestPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add_asset(storage: &Storage, name: &str) -> Asset {
        let asset = Asset::new("o", name, "property", CurrencyCode::parse("AUD").unwrap(), 100.0);
        storage.assets.upsert(asset.clone()).unwrap();
        asset
    }

    fn request(value: Value) -> CreateShareRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_share_url_prefixes_scheme() {
        assert_eq!(share_url("finnest.app", "t"), "https://finnest.app/share/t");
        assert_eq!(
            share_url("http://localhost:3000/", "t"),
            "http://localhost:3000/share/t"
        );
    }

    #[test]
    fn test_create_then_resolve() {
        let (_temp, storage) = create_test_storage();
        let home = add_asset(&storage, "Home");
        add_asset(&storage, "Car");
        let service = ShareService::new(&storage, "https://finnest.test");

        let created = service
            .create(request(json!({
                "tab": "beneficiary",
                "beneficiaryId": 42,
                "assets": [home.id.to_string()],
                "permissions": {"view": true},
                "message": "for you"
            })))
            .unwrap();

        assert_eq!(created.url, format!("https://finnest.test/share/{}", created.token));
        assert!(Uuid::parse_str(&created.token).is_ok());

        let view = service.resolve(&created.token).unwrap();
        assert_eq!(view.share.target_type, ShareTarget::Beneficiary);
        assert_eq!(view.share.target_id.as_deref(), Some("42"));
        assert!(view.share.permissions.view);
        assert!(!view.share.permissions.download);
        assert_eq!(view.assets.len(), 1);
        assert_eq!(view.assets[0].name, "Home");
    }

    #[test]
    fn test_advisor_share_drops_target_id() {
        let (_temp, storage) = create_test_storage();
        let service = ShareService::new(&storage, "finnest.test");

        let created = service
            .create(request(json!({"tab": "advisor", "beneficiaryId": "b-1"})))
            .unwrap();
        let view = service.resolve(&created.token).unwrap();
        assert_eq!(view.share.target_id, None);
        assert!(view.assets.is_empty());
    }

    #[test]
    fn test_tokens_are_unique() {
        let (_temp, storage) = create_test_storage();
        let service = ShareService::new(&storage, "finnest.test");

        let a = service.create(request(json!({"tab": "advisor"}))).unwrap();
        let b = service.create(request(json!({"tab": "advisor"}))).unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(service.list().unwrap().len(), 2);
    }

    #[test]
    fn test_bad_requests_rejected() {
        let (_temp, storage) = create_test_storage();
        let service = ShareService::new(&storage, "finnest.test");

        assert!(service
            .create(request(json!({"tab": "stranger"})))
            .unwrap_err()
            .is_validation());
        assert!(service
            .create(request(json!({"tab": "advisor", "assets": ["ast-ffffffff"]})))
            .unwrap_err()
            .is_not_found());
        assert!(service.list().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_and_revoked_tokens_not_found() {
        let (_temp, storage) = create_test_storage();
        let service = ShareService::new(&storage, "finnest.test");

        assert!(service.resolve("nope").unwrap_err().is_not_found());

        let created = service.create(request(json!({"tab": "advisor"}))).unwrap();
        service.revoke(&created.token).unwrap();
        assert!(service.resolve(&created.token).unwrap_err().is_not_found());
    }

    #[test]
    fn test_deleted_assets_are_skipped() {
        let (_temp, storage) = create_test_storage();
        let home = add_asset(&storage, "Home");
        let car = add_asset(&storage, "Car");
        let service = ShareService::new(&storage, "finnest.test");

        let created = service
            .create(request(json!({
                "tab": "advisor",
                "assets": [home.id.to_string(), car.id.to_string()]
            })))
            .unwrap();
        storage.assets.delete(home.id).unwrap();

        let view = service.resolve(&created.token).unwrap();
        assert_eq!(view.assets.len(), 1);
        assert_eq!(view.assets[0].name, "Car");
    }
}
