//! FX display formatting

use tabled::{settings::Style, Table, Tabled};

use crate::models::{FxRate, ProviderQuote};

#[derive(Tabled)]
struct QuoteRow {
    #[tabled(rename = "Provider")]
    label: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "As of")]
    timestamp: String,
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Pair")]
    pair: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

/// Ranked provider quotes; unavailable ones show `n/a`
pub fn format_quotes(base: &str, quote: &str, quotes: &[ProviderQuote]) -> String {
    let rows = quotes.iter().map(|q| QuoteRow {
        label: q.label.clone(),
        rate: q
            .rate
            .map(|r| format!("{:.6}", r))
            .unwrap_or_else(|| "n/a".to_string()),
        timestamp: q.timestamp.clone().unwrap_or_default(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("1 {} in {}\n{}\n", base, quote, table)
}

pub fn format_rate_list(rates: &[FxRate]) -> String {
    if rates.is_empty() {
        return "No rates stored. Add one with 'finnest fx set'.\n".to_string();
    }

    let rows = rates.iter().map(|r| RateRow {
        pair: r.pair_label(),
        rate: format!("{:.6}", r.rate),
        updated: r
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_quote_shows_na() {
        let quotes = vec![ProviderQuote::unavailable("erapi", "ER API", "https://x")];
        let out = format_quotes("AUD", "USD", &quotes);
        assert!(out.contains("ER API"));
        assert!(out.contains("n/a"));
    }
}
