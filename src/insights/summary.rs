//! Numeric summary of an insight request

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::request::{InsightsRequest, InsuranceInput};

const MS_PER_DAY: f64 = 86_400_000.0;

/// The policy renewing first
#[derive(Debug, Clone, PartialEq)]
pub struct InsuranceRenewal {
    pub policy: InsuranceInput,
    /// Whole days from now until the end date, rounded
    pub days: i64,
    pub end: DateTime<Utc>,
}

/// Figures derived from an [`InsightsRequest`]
///
/// Type buckets keep first-seen order so ties resolve the same way every time.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub display_currency: String,
    pub asset_count: usize,
    pub total: f64,
    pub by_type: Vec<(String, f64)>,
    pub top: Option<String>,
    pub liability_total: f64,
    pub liability_by_type: Vec<(String, f64)>,
    pub contact_count: usize,
    pub documents_count: usize,
    pub insurance_count: usize,
    pub soonest_insurance: Option<InsuranceRenewal>,
    /// Asset currencies in first-seen order
    pub currencies: Vec<String>,
}

impl FeatureSummary {
    pub fn from_request(req: &InsightsRequest, now: DateTime<Utc>) -> Self {
        let display_currency = req.display_currency().to_string();

        let total: f64 = req
            .assets
            .iter()
            .map(|a| a.current_value.unwrap_or(0.0))
            .sum();
        let by_type = bucket(
            req.assets
                .iter()
                .map(|a| (a.asset_type.as_deref(), a.current_value)),
        );
        let top = largest(&by_type).map(|(name, _)| name.clone());

        let liability_total: f64 = req
            .liabilities
            .iter()
            .map(|l| l.current_value.unwrap_or(0.0))
            .sum();
        let liability_by_type = bucket(
            req.liabilities
                .iter()
                .map(|l| (l.liability_type.as_deref(), l.current_value)),
        );

        let mut currencies: Vec<String> = Vec::new();
        for asset in &req.assets {
            let code = asset
                .currency
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(display_currency.as_str())
                .to_string();
            if !currencies.contains(&code) {
                currencies.push(code);
            }
        }

        Self {
            asset_count: req.assets.len(),
            total,
            by_type,
            top,
            liability_total,
            liability_by_type,
            contact_count: req.emergency_contacts.len(),
            documents_count: req.documents.len(),
            insurance_count: req.insurance.len(),
            soonest_insurance: soonest_renewal(&req.insurance, now),
            currencies,
            display_currency,
        }
    }

    /// Positive type buckets, largest first
    pub fn ranked_types(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = self
            .by_type
            .iter()
            .filter(|(_, value)| *value > 0.0)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
    }
}

/// Round half up, the way the dashboard rounds
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn bucket<'a>(items: impl Iterator<Item = (Option<&'a str>, Option<f64>)>) -> Vec<(String, f64)> {
    let mut buckets: Vec<(String, f64)> = Vec::new();
    for (kind, value) in items {
        let key = kind
            .filter(|k| !k.is_empty())
            .unwrap_or("OTHER")
            .to_uppercase();
        let value = value.unwrap_or(0.0);
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, sum)) => *sum += value,
            None => buckets.push((key, value)),
        }
    }
    buckets
}

fn largest(buckets: &[(String, f64)]) -> Option<&(String, f64)> {
    // first maximum wins
    buckets
        .iter()
        .fold(None, |best: Option<&(String, f64)>, entry| match best {
            Some(b) if b.1 >= entry.1 => Some(b),
            _ => Some(entry),
        })
}

fn soonest_renewal(policies: &[InsuranceInput], now: DateTime<Utc>) -> Option<InsuranceRenewal> {
    policies
        .iter()
        .filter_map(|policy| {
            let end = parse_end_date(policy.end_date.as_deref()?)?;
            let millis = (end - now).num_milliseconds() as f64;
            Some(InsuranceRenewal {
                policy: policy.clone(),
                days: round_half_up(millis / MS_PER_DAY),
                end,
            })
        })
        .min_by_key(|renewal| renewal.end)
}

/// RFC 3339, a bare date (midnight UTC), or a naive date-time
fn parse_end_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}
