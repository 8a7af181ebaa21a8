//! Asset display formatting

use tabled::{settings::Style, Table, Tabled};

use crate::models::Asset;
use crate::services::PortfolioTotal;

#[derive(Tabled)]
struct AssetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    asset_type: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Country")]
    country: String,
}

pub fn format_asset_list(assets: &[Asset]) -> String {
    if assets.is_empty() {
        return "No assets found.\n".to_string();
    }

    let rows = assets.iter().map(|a| AssetRow {
        id: a.id.to_string(),
        name: a.name.clone(),
        asset_type: a.asset_type.clone(),
        value: format!("{:.2} {}", a.current_value, a.currency),
        country: a.country.clone().unwrap_or_default(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Converted total followed by whatever could not be converted
pub fn format_portfolio_total(total: &PortfolioTotal) -> String {
    let mut output = format!(
        "Total: {:.2} {} across {} asset(s)\n",
        total.total,
        total.currency,
        total.converted.len()
    );

    if !total.unconvertible.is_empty() {
        output.push_str(&format!(
            "\nNot included (no {} rate):\n",
            total.currency
        ));
        for asset in &total.unconvertible {
            output.push_str(&format!(
                "  {}  {:.2} {}\n",
                asset.name, asset.current_value, asset.currency
            ));
        }
    }

    output
}
