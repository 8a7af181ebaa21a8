//! Household record service
//!
//! Adds and removes liabilities, emergency contacts and insurance policies.
//! Every change is saved immediately and audited.

use chrono::NaiveDate;

use crate::error::{FinnestError, FinnestResult};
use crate::models::{CurrencyCode, EmergencyContact, InsurancePolicy, Liability};
use crate::storage::{HouseholdRecord, RecordRepository, Storage};

/// Fields for a new liability
#[derive(Debug, Clone, Default)]
pub struct NewLiability {
    pub owner_id: String,
    pub liability_type: String,
    pub description: Option<String>,
    pub currency: String,
    pub current_value: f64,
}

/// Fields for a new emergency contact
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub owner_id: String,
    pub name: String,
    pub relation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Fields for a new insurance policy
#[derive(Debug, Clone, Default)]
pub struct NewPolicy {
    pub owner_id: String,
    pub provider: String,
    pub policy_type: String,
    pub policy_number: Option<String>,
    pub premium: Option<f64>,
    pub deductible: Option<f64>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
}

pub struct HouseholdService<'a> {
    storage: &'a Storage,
}

impl<'a> HouseholdService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn add_liability(&self, new: NewLiability) -> FinnestResult<Liability> {
        let mut liability = Liability::new(
            new.owner_id.trim(),
            new.liability_type.trim(),
            CurrencyCode::parse(&new.currency)?,
            new.current_value,
        );
        liability.description = non_blank(new.description);
        liability.validate()?;
        self.insert(&self.storage.liabilities, liability)
    }

    pub fn add_contact(&self, new: NewContact) -> FinnestResult<EmergencyContact> {
        let mut contact = EmergencyContact::new(new.owner_id.trim(), new.name.trim());
        contact.relation = non_blank(new.relation);
        contact.phone = non_blank(new.phone);
        contact.email = non_blank(new.email);
        contact.validate()?;
        self.insert(&self.storage.contacts, contact)
    }

    pub fn add_policy(&self, new: NewPolicy) -> FinnestResult<InsurancePolicy> {
        let mut policy = InsurancePolicy::new(
            new.owner_id.trim(),
            new.provider.trim(),
            new.policy_type.trim(),
        );
        policy.policy_number = non_blank(new.policy_number);
        policy.premium = new.premium;
        policy.deductible = new.deductible;
        policy.end_date = non_blank(new.end_date)
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                    FinnestError::Validation(format!(
                        "Invalid end date '{}', expected YYYY-MM-DD",
                        raw
                    ))
                })
            })
            .transpose()?;
        policy.validate()?;
        self.insert(&self.storage.insurance, policy)
    }

    pub fn liabilities(&self) -> FinnestResult<Vec<Liability>> {
        self.storage.liabilities.get_all()
    }

    pub fn contacts(&self) -> FinnestResult<Vec<EmergencyContact>> {
        self.storage.contacts.get_all()
    }

    /// Policies ordered by end date, soonest first; undated ones last
    pub fn policies(&self) -> FinnestResult<Vec<InsurancePolicy>> {
        let mut policies = self.storage.insurance.get_all()?;
        policies.sort_by_key(|p| (p.end_date.is_none(), p.end_date));
        Ok(policies)
    }

    pub fn remove_liability(&self, identifier: &str) -> FinnestResult<Liability> {
        self.remove(&self.storage.liabilities, identifier)
    }

    pub fn remove_contact(&self, identifier: &str) -> FinnestResult<EmergencyContact> {
        self.remove(&self.storage.contacts, identifier)
    }

    pub fn remove_policy(&self, identifier: &str) -> FinnestResult<InsurancePolicy> {
        self.remove(&self.storage.insurance, identifier)
    }

    fn insert<T: HouseholdRecord>(&self, repo: &RecordRepository<T>, record: T) -> FinnestResult<T> {
        repo.upsert(record.clone())?;
        if let Err(e) = repo.save() {
            let _ = repo.delete(record.id());
            return Err(e);
        }
        self.storage.log_create(
            T::ENTITY,
            record.id().to_string(),
            Some(record.label().to_string()),
            &record,
        )?;
        Ok(record)
    }

    fn remove<T: HouseholdRecord>(
        &self,
        repo: &RecordRepository<T>,
        identifier: &str,
    ) -> FinnestResult<T> {
        let record = repo.resolve(identifier)?;
        repo.delete(record.id())?;
        repo.save()?;
        self.storage.log_delete(
            T::ENTITY,
            record.id().to_string(),
            Some(record.label().to_string()),
            &record,
        )?;
        Ok(record)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
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

    #[test]
    fn test_add_and_remove_liability() {
        let (_temp, storage) = create_test_storage();
        let service = HouseholdService::new(&storage);

        let debt = service
            .add_liability(NewLiability {
                owner_id: "o".into(),
                liability_type: "mortgage".into(),
                description: Some("  ".into()),
                currency: "aud".into(),
                current_value: 400_000.0,
            })
            .unwrap();
        assert_eq!(debt.currency.as_str(), "AUD");
        assert_eq!(debt.description, None);
        assert_eq!(service.liabilities().unwrap().len(), 1);

        service.remove_liability("mortgage").unwrap();
        assert!(service.liabilities().unwrap().is_empty());
        assert!(service.remove_liability("mortgage").unwrap_err().is_not_found());

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_bad_currency_rejected() {
        let (_temp, storage) = create_test_storage();
        let service = HouseholdService::new(&storage);
        let err = service
            .add_liability(NewLiability {
                owner_id: "o".into(),
                liability_type: "loan".into(),
                currency: "dollars".into(),
                current_value: 1.0,
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert!(service.liabilities().unwrap().is_empty());
    }

    #[test]
    fn test_contacts_persist() {
        let (temp, storage) = create_test_storage();
        let service = HouseholdService::new(&storage);
        service
            .add_contact(NewContact {
                owner_id: "o".into(),
                name: "Sam".into(),
                phone: Some("0400 000 000".into()),
                ..Default::default()
            })
            .unwrap();

        let reopened =
            Storage::new(FinnestPaths::with_base_dir(temp.path().to_path_buf())).unwrap();
        reopened.load_all().unwrap();
        let contacts = reopened.contacts.get_all().unwrap();
        assert_eq!(contacts[0].name, "Sam");
        assert_eq!(contacts[0].email, None);
    }

    #[test]
    fn test_policies_sorted_by_end_date() {
        let (_temp, storage) = create_test_storage();
        let service = HouseholdService::new(&storage);
        for (provider, end) in [("Later", Some("2027-01-01")), ("None", None), ("Sooner", Some("2026-12-01"))] {
            service
                .add_policy(NewPolicy {
                    owner_id: "o".into(),
                    provider: provider.into(),
                    policy_type: "home".into(),
                    end_date: end.map(str::to_string),
                    ..Default::default()
                })
                .unwrap();
        }

        let order: Vec<String> = service
            .policies()
            .unwrap()
            .into_iter()
            .map(|p| p.provider)
            .collect();
        assert_eq!(order, vec!["Sooner", "Later", "None"]);
    }

    #[test]
    fn test_invalid_end_date_rejected() {
        let (_temp, storage) = create_test_storage();
        let service = HouseholdService::new(&storage);
        let err = service
            .add_policy(NewPolicy {
                owner_id: "o".into(),
                provider: "Acme".into(),
                policy_type: "life".into(),
                end_date: Some("01/11/2026".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
    }
}
