//! Household records kept beside assets
//!
//! Liabilities, emergency contacts and insurance policies. None of them hold
//! documents; they feed the portfolio insights.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;
use super::ids::{ContactId, LiabilityId, PolicyId};
use crate::error::FinnestError;

/// A debt such as a mortgage or car loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    pub id: LiabilityId,
    pub owner_id: String,

    /// Free-form category such as "mortgage"
    #[serde(rename = "type")]
    pub liability_type: String,

    #[serde(default)]
    pub description: Option<String>,

    pub currency: CurrencyCode,

    /// Outstanding balance in `currency`
    pub current_value: f64,

    pub created_at: DateTime<Utc>,
}

impl Liability {
    pub fn new(
        owner_id: impl Into<String>,
        liability_type: impl Into<String>,
        currency: CurrencyCode,
        current_value: f64,
    ) -> Self {
        Self {
            id: LiabilityId::new(),
            owner_id: owner_id.into(),
            liability_type: liability_type.into(),
            description: None,
            currency,
            current_value,
            created_at: Utc::now(),
        }
    }

    /// Type and value are required; the value must be a non-negative number
    pub fn validate(&self) -> Result<(), FinnestError> {
        if self.liability_type.trim().is_empty() {
            return Err(FinnestError::Validation(
                "Liability type cannot be empty".into(),
            ));
        }
        if !self.current_value.is_finite() || self.current_value < 0.0 {
            return Err(FinnestError::Validation(format!(
                "Liability value must be a non-negative number, got {}",
                self.current_value
            )));
        }
        Ok(())
    }

    /// Label used in listings and name lookups
    pub fn label(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(self.liability_type.as_str())
    }
}

/// Someone to call in an emergency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: ContactId,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EmergencyContact {
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ContactId::new(),
            owner_id: owner_id.into(),
            name: name.into(),
            relation: None,
            phone: None,
            email: None,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), FinnestError> {
        if self.name.trim().is_empty() {
            return Err(FinnestError::Validation(
                "Contact name cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

/// An insurance policy; `end_date` drives renewal reminders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub id: PolicyId,
    pub owner_id: String,

    /// Insurer name
    pub provider: String,

    /// Free-form category such as "home" or "life"
    #[serde(rename = "type")]
    pub policy_type: String,

    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub premium: Option<f64>,
    #[serde(default)]
    pub deductible: Option<f64>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

impl InsurancePolicy {
    pub fn new(
        owner_id: impl Into<String>,
        provider: impl Into<String>,
        policy_type: impl Into<String>,
    ) -> Self {
        Self {
            id: PolicyId::new(),
            owner_id: owner_id.into(),
            provider: provider.into(),
            policy_type: policy_type.into(),
            policy_number: None,
            premium: None,
            deductible: None,
            end_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), FinnestError> {
        if self.provider.trim().is_empty() {
            return Err(FinnestError::Validation(
                "Insurance provider cannot be empty".into(),
            ));
        }
        for (field, value) in [("premium", self.premium), ("deductible", self.deductible)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(FinnestError::Validation(format!(
                        "Insurance {} must be a non-negative number, got {}",
                        field, v
                    )));
                }
            }
        }
        Ok(())
    }
}
