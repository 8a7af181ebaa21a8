//! User settings for FinNest
//!
//! Manages user preferences including display currency, the document
//! encryption policy, FX provider options, and the insights/server endpoints.

use serde::{Deserialize, Serialize};

use super::paths::FinnestPaths;
use crate::crypto::key_derivation::KdfParams;
use crate::error::FinnestError;

/// Environment variable holding the OpenExchangeRates app id
pub const OXR_APP_ID_ENV: &str = "OPENEXCHANGERATES_APP_ID";

/// Environment variable holding the LLM API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Policy applied when encrypting documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionPolicy {
    /// Minimum passphrase length in characters
    #[serde(default = "default_min_passphrase_len")]
    pub min_passphrase_len: usize,

    /// Key derivation used for new uploads
    #[serde(default)]
    pub kdf: KdfParams,
}

fn default_min_passphrase_len() -> usize {
    6
}

impl Default for EncryptionPolicy {
    fn default() -> Self {
        Self {
            min_passphrase_len: default_min_passphrase_len(),
            kdf: KdfParams::default(),
        }
    }
}

/// FX provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxSettings {
    /// OpenExchangeRates app id; the provider is skipped when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openexchangerates_app_id: Option<String>,

    /// Per-provider request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// `s-maxage` advertised by the compare endpoint
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,

    /// `stale-while-revalidate` advertised by the compare endpoint
    #[serde(default = "default_stale_while_revalidate_secs")]
    pub stale_while_revalidate_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_cache_max_age_secs() -> u64 {
    300
}

fn default_stale_while_revalidate_secs() -> u64 {
    600
}

impl Default for FxSettings {
    fn default() -> Self {
        Self {
            openexchangerates_app_id: None,
            request_timeout_secs: default_request_timeout_secs(),
            cache_max_age_secs: default_cache_max_age_secs(),
            stale_while_revalidate_secs: default_stale_while_revalidate_secs(),
        }
    }
}

impl FxSettings {
    /// The OpenExchangeRates app id, preferring the environment over the file
    pub fn resolved_app_id(&self) -> Option<String> {
        std::env::var(OXR_APP_ID_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.openexchangerates_app_id.clone())
    }

    /// The `cache-control` header value for compare responses
    pub fn cache_control(&self) -> String {
        format!(
            "s-maxage={}, stale-while-revalidate={}",
            self.cache_max_age_secs, self.stale_while_revalidate_secs
        )
    }
}

/// Insight generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsSettings {
    /// Chat model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout for the completion call
    #[serde(default = "default_insights_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_insights_timeout_secs() -> u64 {
    30
}

impl Default for InsightsSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            request_timeout_secs: default_insights_timeout_secs(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Public origin used when building share URLs
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_url: default_public_url(),
        }
    }
}

/// User settings for FinNest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency that totals are displayed in
    #[serde(default = "default_display_currency")]
    pub display_currency: String,

    /// Document encryption policy
    #[serde(default)]
    pub encryption: EncryptionPolicy,

    /// FX provider settings
    #[serde(default)]
    pub fx: FxSettings,

    /// Insight generator settings
    #[serde(default)]
    pub insights: InsightsSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_display_currency() -> String {
    "AUD".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            display_currency: default_display_currency(),
            encryption: EncryptionPolicy::default(),
            fx: FxSettings::default(),
            insights: InsightsSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &FinnestPaths) -> Result<Self, FinnestError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                FinnestError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                FinnestError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &FinnestPaths) -> Result<(), FinnestError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            FinnestError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(&settings_path, contents).map_err(|e| {
            FinnestError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
