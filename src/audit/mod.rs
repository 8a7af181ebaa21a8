//! Audit logging system for FinNest
//!
//! Records creates, deletes and content reads of documents, rates, shares and
//! assets in an append-only JSONL log.
//!
//! # Example
//!
//! ```rust,ignore
//! use finnest::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(audit_log_path);
//! let entry = AuditEntry::create(
//!     EntityType::Document,
//!     document.id.to_string(),
//!     Some(document.name.clone()),
//!     &document,
//! );
//! logger.log(&entry)?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
