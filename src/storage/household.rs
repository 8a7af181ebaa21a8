//! Repositories for liabilities, emergency contacts and insurance policies
//!
//! The three record kinds share one implementation; each is stored in its own
//! JSON file as `{"records": [...]}`.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::audit::EntityType;
use crate::error::{FinnestError, FinnestResult};
use crate::models::{
    ContactId, EmergencyContact, InsurancePolicy, Liability, LiabilityId, PolicyId,
};

use super::file_io::{read_json, write_json_atomic};

/// A record kept in a [`RecordRepository`]
pub trait HouseholdRecord: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Eq + Hash + std::fmt::Display;

    /// Name used in not-found errors
    const KIND: &'static str;
    const ENTITY: EntityType;

    fn id(&self) -> Self::Id;

    /// Name shown in listings and matched by lookups
    fn label(&self) -> &str;

    /// Whether `identifier` is this record's printed ID or a prefix of it
    fn id_matches(&self, identifier: &str) -> bool;
}

impl HouseholdRecord for Liability {
    type Id = LiabilityId;
    const KIND: &'static str = "Liability";
    const ENTITY: EntityType = EntityType::Liability;

    fn id(&self) -> LiabilityId {
        self.id
    }

    fn label(&self) -> &str {
        Liability::label(self)
    }

    fn id_matches(&self, identifier: &str) -> bool {
        self.id.matches_prefix(identifier)
    }
}

impl HouseholdRecord for EmergencyContact {
    type Id = ContactId;
    const KIND: &'static str = "Contact";
    const ENTITY: EntityType = EntityType::Contact;

    fn id(&self) -> ContactId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn id_matches(&self, identifier: &str) -> bool {
        self.id.matches_prefix(identifier)
    }
}

impl HouseholdRecord for InsurancePolicy {
    type Id = PolicyId;
    const KIND: &'static str = "Insurance policy";
    const ENTITY: EntityType = EntityType::Insurance;

    fn id(&self) -> PolicyId {
        self.id
    }

    fn label(&self) -> &str {
        &self.provider
    }

    fn id_matches(&self, identifier: &str) -> bool {
        self.id.matches_prefix(identifier)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: HouseholdRecord")]
struct RecordData<T: HouseholdRecord> {
    #[serde(default = "Vec::new")]
    records: Vec<T>,
}

impl<T: HouseholdRecord> Default for RecordData<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

/// JSON-file repository for one kind of household record
pub struct RecordRepository<T: HouseholdRecord> {
    path: PathBuf,
    data: RwLock<HashMap<T::Id, T>>,
}

pub type LiabilityRepository = RecordRepository<Liability>;
pub type ContactRepository = RecordRepository<EmergencyContact>;
pub type InsuranceRepository = RecordRepository<InsurancePolicy>;

impl<T: HouseholdRecord> RecordRepository<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> FinnestResult<()> {
        let file_data: RecordData<T> = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for record in file_data.records {
            data.insert(record.id(), record);
        }

        Ok(())
    }

    pub fn save(&self) -> FinnestResult<()> {
        let records = self.get_all()?;
        write_json_atomic(&self.path, &RecordData { records })
    }

    /// Get all records sorted by label
    pub fn get_all(&self) -> FinnestResult<Vec<T>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut records: Vec<T> = data.values().cloned().collect();
        records.sort_by_key(|r| r.label().to_lowercase());
        Ok(records)
    }

    /// Find a record by printed ID, ID prefix or exact label
    pub fn resolve(&self, identifier: &str) -> FinnestResult<T> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let label = identifier.trim().to_lowercase();
        let mut matches: Vec<&T> = data.values().filter(|r| r.id_matches(identifier)).collect();
        if matches.is_empty() {
            matches = data
                .values()
                .filter(|r| r.label().to_lowercase() == label)
                .collect();
        }

        match matches.as_slice() {
            [record] => Ok((*record).clone()),
            [] => Err(FinnestError::NotFound {
                entity_type: T::KIND,
                identifier: identifier.to_string(),
            }),
            _ => Err(FinnestError::Validation(format!(
                "{} '{}' is ambiguous ({} matches)",
                T::KIND,
                identifier,
                matches.len()
            ))),
        }
    }

    pub fn upsert(&self, record: T) -> FinnestResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(record.id(), record);
        Ok(())
    }

    pub fn delete(&self, id: T::Id) -> FinnestResult<Option<T>> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CurrencyCode;
    use tempfile::TempDir;

    fn debt(kind: &str) -> Liability {
        Liability::new("o", kind, CurrencyCode::parse("AUD").unwrap(), 10.0)
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("liabilities.json");
        let repo = LiabilityRepository::new(path.clone());
        repo.upsert(debt("mortgage")).unwrap();
        repo.upsert(debt("car loan")).unwrap();
        repo.save().unwrap();

        let reloaded = LiabilityRepository::new(path);
        reloaded.load().unwrap();
        let kinds: Vec<String> = reloaded
            .get_all()
            .unwrap()
            .into_iter()
            .map(|l| l.liability_type)
            .collect();
        assert_eq!(kinds, vec!["car loan", "mortgage"]);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let repo = ContactRepository::new(temp.path().join("contacts.json"));
        repo.load().unwrap();
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_by_label_or_id() {
        let temp = TempDir::new().unwrap();
        let repo = InsuranceRepository::new(temp.path().join("insurance.json"));
        let policy = InsurancePolicy::new("o", "Acme Mutual", "home");
        let printed = policy.id.to_string();
        repo.upsert(policy).unwrap();

        assert_eq!(repo.resolve("acme mutual").unwrap().policy_type, "home");
        assert_eq!(repo.resolve(&printed).unwrap().provider, "Acme Mutual");
        assert!(repo.resolve("Other").unwrap_err().is_not_found());
    }

    #[test]
    fn test_ambiguous_label_rejected() {
        let temp = TempDir::new().unwrap();
        let repo = LiabilityRepository::new(temp.path().join("liabilities.json"));
        repo.upsert(debt("loan")).unwrap();
        repo.upsert(debt("loan")).unwrap();
        assert!(repo.resolve("loan").unwrap_err().is_validation());
    }
}
