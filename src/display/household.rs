//! Liability, contact and insurance tables

use tabled::{settings::Style, Table, Tabled};

use crate::models::{EmergencyContact, InsurancePolicy, Liability};

#[derive(Tabled)]
struct LiabilityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    liability_type: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Relation")]
    relation: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Email")]
    email: String,
}

#[derive(Tabled)]
struct PolicyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Type")]
    policy_type: String,
    #[tabled(rename = "Premium")]
    premium: String,
    #[tabled(rename = "Ends")]
    end_date: String,
}

fn table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

pub fn format_liability_list(liabilities: &[Liability]) -> String {
    if liabilities.is_empty() {
        return "No liabilities found.\n".to_string();
    }
    table(liabilities.iter().map(|l| LiabilityRow {
        id: l.id.to_string(),
        liability_type: l.liability_type.clone(),
        description: l.description.clone().unwrap_or_default(),
        balance: format!("{:.2} {}", l.current_value, l.currency),
    }))
}

pub fn format_contact_list(contacts: &[EmergencyContact]) -> String {
    if contacts.is_empty() {
        return "No emergency contacts found.\n".to_string();
    }
    table(contacts.iter().map(|c| ContactRow {
        id: c.id.to_string(),
        name: c.name.clone(),
        relation: c.relation.clone().unwrap_or_default(),
        phone: c.phone.clone().unwrap_or_default(),
        email: c.email.clone().unwrap_or_default(),
    }))
}

pub fn format_policy_list(policies: &[InsurancePolicy]) -> String {
    if policies.is_empty() {
        return "No insurance policies found.\n".to_string();
    }
    table(policies.iter().map(|p| PolicyRow {
        id: p.id.to_string(),
        provider: p.provider.clone(),
        policy_type: p.policy_type.clone(),
        premium: p.premium.map(|v| format!("{:.2}", v)).unwrap_or_default(),
        end_date: p
            .end_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CurrencyCode;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_liability_list(&[]), "No liabilities found.\n");
        assert_eq!(format_contact_list(&[]), "No emergency contacts found.\n");
        assert_eq!(format_policy_list(&[]), "No insurance policies found.\n");
    }

    #[test]
    fn test_rows_show_values() {
        let debt = Liability::new("o", "mortgage", CurrencyCode::parse("AUD").unwrap(), 1234.5);
        let out = format_liability_list(&[debt]);
        assert!(out.contains("mortgage"));
        assert!(out.contains("1234.50 AUD"));

        let mut policy = InsurancePolicy::new("o", "Acme", "home");
        policy.end_date = NaiveDate::from_ymd_opt(2026, 11, 1);
        assert!(format_policy_list(&[policy]).contains("2026-11-01"));
    }
}
