//! Path management for FinNest
//!
//! Provides XDG-compliant path resolution for configuration, records, and blobs.
//!
//! ## Path Resolution Order
//!
//! 1. `FINNEST_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/finnest` or `~/.config/finnest`
//! 3. Windows: `%APPDATA%\finnest`

use std::path::PathBuf;

use crate::error::FinnestError;

/// Manages all paths used by FinNest
#[derive(Debug, Clone)]
pub struct FinnestPaths {
    /// Base directory for all FinNest data
    base_dir: PathBuf,
}

impl FinnestPaths {
    /// Create a new FinnestPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration directory can be determined.
    pub fn new() -> Result<Self, FinnestError> {
        let base_dir = if let Ok(custom) = std::env::var("FINNEST_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create FinnestPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/finnest/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the record directory (~/.config/finnest/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the blob directory (~/.config/finnest/blobs/)
    pub fn blob_dir(&self) -> PathBuf {
        self.base_dir.join("blobs")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to documents.json
    pub fn documents_file(&self) -> PathBuf {
        self.data_dir().join("documents.json")
    }

    /// Get the path to fx_rates.json
    pub fn fx_rates_file(&self) -> PathBuf {
        self.data_dir().join("fx_rates.json")
    }

    /// Get the path to shares.json
    pub fn shares_file(&self) -> PathBuf {
        self.data_dir().join("shares.json")
    }

    /// Get the path to assets.json
    pub fn assets_file(&self) -> PathBuf {
        self.data_dir().join("assets.json")
    }

    /// Get the path to liabilities.json
    pub fn liabilities_file(&self) -> PathBuf {
        self.data_dir().join("liabilities.json")
    }

    /// Get the path to contacts.json
    pub fn contacts_file(&self) -> PathBuf {
        self.data_dir().join("contacts.json")
    }

    /// Get the path to insurance.json
    pub fn insurance_file(&self) -> PathBuf {
        self.data_dir().join("insurance.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), FinnestError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| FinnestError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| FinnestError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.blob_dir())
            .map_err(|e| FinnestError::Io(format!("Failed to create blob directory: {}", e)))?;

        Ok(())
    }

    /// Check if FinNest has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default base directory for the current platform
fn resolve_default_path() -> Result<PathBuf, FinnestError> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| FinnestError::Config("Could not determine home directory".into()))?;
    Ok(dirs.config_dir().join("finnest"))
}
