//! Document display formatting

use tabled::{settings::Style, Table, Tabled};

use crate::models::Document;
use crate::services::{UploadItem, UploadStatus};

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Encrypted")]
    encrypted: &'static str,
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Uploaded")]
    uploaded: String,
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Format documents as a table
pub fn format_document_list(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "No documents found.\n".to_string();
    }

    let rows = documents.iter().map(|d| DocumentRow {
        id: d.id.to_string(),
        name: d.name.clone(),
        size: format_size(d.size),
        encrypted: if d.is_encrypted() { "yes" } else { "no" },
        asset: d.asset_id.map(|a| a.to_string()).unwrap_or_default(),
        uploaded: d.created_at.format("%Y-%m-%d %H:%M").to_string(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// One line per upload item
pub fn format_upload_item(item: &UploadItem) -> String {
    let state = match &item.status {
        UploadStatus::Queued => "queued".to_string(),
        UploadStatus::Uploading => "uploading".to_string(),
        UploadStatus::Done { document } => format!("done ({})", document.id),
        UploadStatus::Error { message } => format!("error: {}", message),
    };
    format!("[{:>3}%] {}  {}", item.progress, item.name, state)
}

/// Batch outcome summary
pub fn format_upload_summary(items: &[UploadItem]) -> String {
    let done = items.iter().filter(|i| i.is_done()).count();
    let failed = items.len() - done;
    if failed == 0 {
        format!("Uploaded {} file(s).", done)
    } else {
        format!("Uploaded {} file(s), {} failed.", done, failed)
    }
}
