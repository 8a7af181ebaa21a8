//! Storage layer for FinNest
//!
//! Record files are JSON with atomic writes; document bytes go through a
//! [`BlobStore`]. Every mutation made through the services is mirrored to the
//! audit log.

pub mod assets;
pub mod blob_store;
pub mod documents;
pub mod file_io;
pub mod fx_rates;
pub mod household;
pub mod shares;

pub use assets::AssetRepository;
pub use blob_store::{BlobStore, LocalBlobStore, MemoryBlobStore, OCTET_STREAM};
pub use documents::DocumentRepository;
pub use file_io::{read_json, write_json_atomic};
pub use fx_rates::FxRateRepository;
pub use household::{
    ContactRepository, HouseholdRecord, InsuranceRepository, LiabilityRepository, RecordRepository,
};
pub use shares::ShareRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::FinnestPaths;
use crate::error::FinnestResult;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: FinnestPaths,
    audit: AuditLogger,
    pub documents: DocumentRepository,
    pub fx_rates: FxRateRepository,
    pub shares: ShareRepository,
    pub assets: AssetRepository,
    pub liabilities: LiabilityRepository,
    pub contacts: ContactRepository,
    pub insurance: InsuranceRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: FinnestPaths) -> FinnestResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            documents: DocumentRepository::new(paths.documents_file()),
            fx_rates: FxRateRepository::new(paths.fx_rates_file()),
            shares: ShareRepository::new(paths.shares_file()),
            assets: AssetRepository::new(paths.assets_file()),
            liabilities: LiabilityRepository::new(paths.liabilities_file()),
            contacts: ContactRepository::new(paths.contacts_file()),
            insurance: InsuranceRepository::new(paths.insurance_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &FinnestPaths {
        &self.paths
    }

    /// Directory-backed blob store rooted at the configured blob directory
    pub fn local_blobs(&self) -> LocalBlobStore {
        LocalBlobStore::new(self.paths.blob_dir())
    }

    /// Load all data from disk
    pub fn load_all(&self) -> FinnestResult<()> {
        self.documents.load()?;
        self.fx_rates.load()?;
        self.shares.load()?;
        self.assets.load()?;
        self.liabilities.load()?;
        self.contacts.load()?;
        self.insurance.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> FinnestResult<()> {
        self.documents.save()?;
        self.fx_rates.save()?;
        self.shares.save()?;
        self.assets.save()?;
        self.liabilities.save()?;
        self.contacts.save()?;
        self.insurance.save()?;
        Ok(())
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Record a create in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> FinnestResult<()> {
        self.audit.log(&AuditEntry::create(
            entity_type,
            entity_id,
            entity_name,
            entity,
        ))
    }

    /// Record an update in the audit log
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> FinnestResult<()> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    /// Record a delete in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> FinnestResult<()> {
        self.audit.log(&AuditEntry::delete(
            entity_type,
            entity_id,
            entity_name,
            entity,
        ))
    }

    /// Record a read of protected contents
    pub fn log_access(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        detail: &str,
    ) -> FinnestResult<()> {
        self.audit
            .log(&AuditEntry::access(entity_type, entity_id, entity_name).with_detail(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinnestPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(temp_dir.path().join("blobs").exists());
        assert!(!storage.paths().is_initialized());
    }

    #[test]
    fn test_load_save_round_trip_on_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::new(FinnestPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();

        storage.load_all().unwrap();
        storage.save_all().unwrap();
        assert!(temp_dir.path().join("data").join("documents.json").exists());
        assert!(temp_dir.path().join("data").join("shares.json").exists());
    }

    #[test]
    fn test_audit_helpers_append() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::new(FinnestPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();

        storage
            .log_create(EntityType::Share, "tok", None, &serde_json::json!({"v": 1}))
            .unwrap();
        storage
            .log_access(EntityType::Share, "tok", None, "resolved")
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].operation, Operation::Access);
    }
}
