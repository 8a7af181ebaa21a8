//! Custom error types for FinNest
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for FinNest operations
#[derive(Error, Debug)]
pub enum FinnestError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors (bad currency code, short passphrase, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors (record files and blob store)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encryption errors (cipher or KDF failure while sealing a file)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Decryption errors (wrong passphrase, tampering, unreadable metadata)
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// A rate provider misbehaved
    #[error("Provider error: {0}")]
    Provider(String),

    /// Outbound HTTP failures
    #[error("HTTP error: {0}")]
    Http(String),

    /// Insight generation failures
    #[error("Insights error: {0}")]
    Insights(String),
}

impl FinnestError {
    /// Create a "not found" error for documents
    pub fn document_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Document",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for assets
    pub fn asset_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Asset",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for share links
    pub fn share_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Share",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for stored objects
    pub fn blob_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Blob",
            identifier: key.into(),
        }
    }

    /// Create a "not found" error for FX rates
    pub fn rate_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "FX rate",
            identifier: identifier.into(),
        }
    }

    /// The canonical error for a failed authentication check on decrypt
    pub fn wrong_passphrase() -> Self {
        Self::Decryption("wrong passphrase or corrupted data".to_string())
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a decryption error
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for FinnestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FinnestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for FinnestError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Result type alias for FinNest operations
pub type FinnestResult<T> = Result<T, FinnestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FinnestError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = FinnestError::document_not_found("doc-1234abcd");
        assert_eq!(err.to_string(), "Document not found: doc-1234abcd");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_wrong_passphrase_is_decryption() {
        let err = FinnestError::wrong_passphrase();
        assert!(err.is_decryption());
        assert!(!err.is_validation());
        assert_eq!(
            err.to_string(),
            "Decryption error: wrong passphrase or corrupted data"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FinnestError = io_err.into();
        assert!(matches!(err, FinnestError::Io(_)));
    }
}
