//! Display formatting for terminal output
//!
//! Formats documents, rates, assets, household records and insights as
//! tables and short reports.

pub mod asset;
pub mod document;
pub mod fx;
pub mod household;
pub mod insights;

pub use asset::{format_asset_list, format_portfolio_total};
pub use document::{format_document_list, format_size, format_upload_item, format_upload_summary};
pub use fx::{format_quotes, format_rate_list};
pub use household::{format_contact_list, format_liability_list, format_policy_list};
pub use insights::format_insights;
