//! Locally computed insights
//!
//! Used when no language model is configured, when it fails, and to top up
//! a short model answer.

use super::sanitize::Insight;
use super::summary::{round_half_up, FeatureSummary};

fn plural(count: i64, one: &str, many: &str) -> String {
    if count == 1 {
        one.to_string()
    } else {
        many.to_string()
    }
}

/// Observational items derived from the summary, most general first
///
/// Nothing is produced for an empty or zero-valued portfolio.
pub fn build_fallback_insights(summary: &FeatureSummary) -> Vec<Insight> {
    let mut items = Vec::new();
    if summary.total <= 0.0 || summary.asset_count == 0 {
        return items;
    }

    items.push(Insight::new(
        "Portfolio overview",
        "Insight",
        &format!(
            "You track {} assets totaling {} in {}, led by {}",
            summary.asset_count,
            round_half_up(summary.total),
            summary.display_currency,
            summary.top.as_deref().unwrap_or("N/A")
        ),
    ));

    let ranked = summary.ranked_types();
    if let Some((top_category, top_value)) = ranked.first() {
        let share = round_half_up(top_value / summary.total * 100.0);
        items.push(Insight::new(
            "Top category concentration",
            "Insight",
            &format!(
                "{} represents approximately {}% of the portfolio's value",
                top_category, share
            ),
        ));
    }

    if ranked.len() > 1 {
        items.push(Insight::new(
            "Category diversity",
            "Insight",
            &format!(
                "You hold {} distinct categories, led by {}",
                ranked.len(),
                ranked[0].0
            ),
        ));
    }

    if summary.liability_total > 0.0 {
        let ratio = round_half_up(summary.liability_total / summary.total * 100.0);
        items.push(Insight::new(
            "Liabilities snapshot",
            "Insight",
            &format!(
                "Liabilities total {} ({}% of assets)",
                round_half_up(summary.liability_total),
                ratio
            ),
        ));
    }

    if summary.contact_count == 0 {
        items.push(Insight::new(
            "Emergency contacts",
            "Attention",
            "No emergency contact is on record; add at least one for quick access",
        ));
    } else {
        let count = summary.contact_count as i64;
        items.push(Insight::new(
            "Emergency contacts",
            "Positive",
            &format!(
                "You have {} emergency {} recorded",
                count,
                plural(count, "contact", "contacts")
            ),
        ));
    }

    if summary.documents_count == 0 {
        items.push(Insight::new(
            "Document storage",
            "Suggestion",
            "No documents have been uploaded; attach key files to centralize information",
        ));
    } else {
        let count = summary.documents_count as i64;
        items.push(Insight::new(
            "Document count",
            "Positive",
            &format!(
                "You store {} {}",
                count,
                plural(count, "document", "documents")
            ),
        ));
    }

    if let Some(renewal) = &summary.soonest_insurance {
        items.push(Insight::new(
            "Insurance renewal",
            "Attention",
            &format!(
                "{} ({}) renews in {} {} ({})",
                renewal
                    .policy
                    .provider
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .unwrap_or("A policy"),
                renewal
                    .policy
                    .policy_type
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .unwrap_or("Insurance"),
                renewal.days,
                plural(renewal.days, "day", "days"),
                renewal.end.format("%Y-%m-%d")
            ),
        ));
    }

    match summary.currencies.as_slice() {
        [] => {}
        [only] => items.push(Insight::new(
            "Currency base",
            "Insight",
            &format!("All tracked assets are denominated in {}", only),
        )),
        many => items.push(Insight::new(
            "Currency mix",
            "Insight",
            &format!(
                "Values span {} currencies ({})",
                many.len(),
                many.join(", ")
            ),
        )),
    }

    items
}
