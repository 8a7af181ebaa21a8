//! Insight request payload
//!
//! Every field is optional on the wire. Whatever cannot be read is treated as
//! absent instead of failing the request.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One asset as seen by the insight generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetInput {
    #[serde(default, rename = "type")]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_value: Option<f64>,
}

/// One liability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiabilityInput {
    #[serde(default, rename = "type")]
    pub liability_type: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// An insurance policy; `end_date` drives renewal reminders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceInput {
    #[serde(default, rename = "type")]
    pub policy_type: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub premium: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub deductible: Option<f64>,
}

/// Snapshot of a household's records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    #[serde(default)]
    pub assets: Vec<AssetInput>,
    #[serde(default)]
    pub liabilities: Vec<LiabilityInput>,
    #[serde(default)]
    pub emergency_contacts: Vec<ContactInput>,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
    #[serde(default)]
    pub insurance: Vec<InsuranceInput>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl InsightsRequest {
    /// Read a request from arbitrary JSON
    ///
    /// Fields that are not arrays become empty lists and unreadable entries
    /// become empty records, so a malformed body yields an empty request.
    pub fn from_value(value: &Value) -> Self {
        Self {
            assets: list(value, "assets"),
            liabilities: list(value, "liabilities"),
            emergency_contacts: list(value, "emergencyContacts"),
            documents: list(value, "documents"),
            insurance: list(value, "insurance"),
            currency: value
                .get("currency")
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    /// Parse a raw body; anything that is not JSON is an empty request
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice::<Value>(body)
            .map(|v| Self::from_value(&v))
            .unwrap_or_default()
    }

    /// Currency totals are reported in, `USD` unless given
    pub fn display_currency(&self) -> &str {
        self.currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("USD")
    }
}

fn list<T>(value: &Value, key: &str) -> Vec<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| serde_json::from_value(item.clone()).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}

/// Accepts numbers, numeric strings and null
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case_fields() {
        let req = InsightsRequest::from_value(&json!({
            "assets": [{"type": "property", "currency": "AUD", "current_value": 100}],
            "emergencyContacts": [{"name": "Sam"}],
            "insurance": [{"provider": "Acme", "endDate": "2026-11-01"}],
            "currency": "AUD"
        }));

        assert_eq!(req.assets.len(), 1);
        assert_eq!(req.assets[0].current_value, Some(100.0));
        assert_eq!(req.emergency_contacts.len(), 1);
        assert_eq!(req.insurance[0].end_date.as_deref(), Some("2026-11-01"));
        assert_eq!(req.display_currency(), "AUD");
    }

    #[test]
    fn test_non_arrays_become_empty() {
        let req = InsightsRequest::from_value(&json!({"assets": "lots", "documents": 3}));
        assert!(req.assets.is_empty());
        assert!(req.documents.is_empty());
        assert_eq!(req.display_currency(), "USD");
    }

    #[test]
    fn test_malformed_body_is_empty_request() {
        assert_eq!(InsightsRequest::from_body(b"{not json"), InsightsRequest::default());
    }

    #[test]
    fn test_values_are_read_leniently() {
        let req = InsightsRequest::from_value(&json!({
            "assets": [
                {"current_value": "250.5"},
                {"current_value": null},
                {"current_value": "n/a"},
                42
            ]
        }));
        let values: Vec<Option<f64>> = req.assets.iter().map(|a| a.current_value).collect();
        assert_eq!(values, vec![Some(250.5), None, None, None]);
    }
}
