//! Insights CLI command

use std::path::Path;

use serde_json::Value;

use crate::config::Settings;
use crate::display::format_insights;
use crate::error::FinnestResult;
use crate::insights::request::{
    AssetInput, ContactInput, DocumentInput, InsuranceInput, LiabilityInput,
};
use crate::insights::{InsightsRequest, InsightsService};
use crate::storage::file_io::read_json_required;
use crate::storage::Storage;

/// Snapshot of what the vault itself knows
pub fn request_from_storage(storage: &Storage, currency: &str) -> FinnestResult<InsightsRequest> {
    let assets = storage
        .assets
        .get_all()?
        .into_iter()
        .map(|a| AssetInput {
            asset_type: Some(a.asset_type),
            currency: Some(a.currency.to_string()),
            current_value: Some(a.current_value),
        })
        .collect();
    let documents = storage
        .documents
        .get_all()?
        .into_iter()
        .map(|d| DocumentInput {
            id: Some(d.id.to_string()),
            asset_id: d.asset_id.map(|a| a.to_string()),
            name: Some(d.name),
            content_type: d.content_type,
            created_at: Some(d.created_at.to_rfc3339()),
        })
        .collect();

    let liabilities = storage
        .liabilities
        .get_all()?
        .into_iter()
        .map(|l| LiabilityInput {
            liability_type: Some(l.liability_type),
            currency: Some(l.currency.to_string()),
            current_value: Some(l.current_value),
            description: l.description,
        })
        .collect();
    let emergency_contacts = storage
        .contacts
        .get_all()?
        .into_iter()
        .map(|c| ContactInput {
            name: Some(c.name),
            relation: c.relation,
            phone: c.phone,
            email: c.email,
        })
        .collect();
    let insurance = storage
        .insurance
        .get_all()?
        .into_iter()
        .map(|p| InsuranceInput {
            policy_type: Some(p.policy_type),
            provider: Some(p.provider),
            end_date: p.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
            premium: p.premium,
            deductible: p.deductible,
        })
        .collect();

    Ok(InsightsRequest {
        assets,
        liabilities,
        emergency_contacts,
        documents,
        insurance,
        currency: Some(currency.to_string()),
    })
}

/// Print insights for a request file, or for the local vault
pub async fn handle_insights_command(
    storage: &Storage,
    settings: &Settings,
    file: Option<&Path>,
) -> FinnestResult<()> {
    let request = match file {
        Some(path) => InsightsRequest::from_value(&read_json_required::<Value, _>(path)?),
        None => request_from_storage(storage, &settings.display_currency)?,
    };

    let service = InsightsService::from_settings(&settings.insights)?;
    let response = service.generate(&request).await;
    print!("{}", format_insights(&response));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinnestPaths;
    use crate::models::{Asset, CurrencyCode};
    use crate::services::{HouseholdService, NewContact, NewLiability, NewPolicy};
    use tempfile::TempDir;

    #[test]
    fn test_request_from_storage() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::new(FinnestPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        storage.load_all().unwrap();
        storage
            .assets
            .upsert(Asset::new("o", "Flat", "property", CurrencyCode::parse("AUD").unwrap(), 5.0))
            .unwrap();

        let request = request_from_storage(&storage, "AUD").unwrap();
        assert_eq!(request.assets.len(), 1);
        assert_eq!(request.assets[0].asset_type.as_deref(), Some("property"));
        assert!(request.documents.is_empty());
        assert!(request.emergency_contacts.is_empty());
        assert_eq!(request.display_currency(), "AUD");
    }

    #[test]
    fn test_request_carries_household_records() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::new(FinnestPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        storage.load_all().unwrap();
        let service = HouseholdService::new(&storage);
        service
            .add_liability(NewLiability {
                owner_id: "o".into(),
                liability_type: "mortgage".into(),
                currency: "AUD".into(),
                current_value: 300.0,
                ..Default::default()
            })
            .unwrap();
        service
            .add_contact(NewContact {
                owner_id: "o".into(),
                name: "Sam".into(),
                ..Default::default()
            })
            .unwrap();
        service
            .add_policy(NewPolicy {
                owner_id: "o".into(),
                provider: "Acme".into(),
                policy_type: "home".into(),
                end_date: Some("2026-11-01".into()),
                ..Default::default()
            })
            .unwrap();

        let request = request_from_storage(&storage, "AUD").unwrap();
        assert_eq!(request.liabilities[0].current_value, Some(300.0));
        assert_eq!(request.emergency_contacts[0].name.as_deref(), Some("Sam"));
        assert_eq!(request.insurance[0].end_date.as_deref(), Some("2026-11-01"));
    }
}
