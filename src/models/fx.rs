//! FX rate observations and provider quotes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;
use crate::error::FinnestError;

/// One directed exchange rate: 1 `base` = `rate` `quote`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
    pub rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FxRate {
    /// Create a rate stamped now; the rate must be finite and positive
    pub fn new(base: CurrencyCode, quote: CurrencyCode, rate: f64) -> Result<Self, FinnestError> {
        let fx = Self {
            base,
            quote,
            rate,
            updated_at: Some(Utc::now()),
        };
        fx.validate()?;
        Ok(fx)
    }

    pub fn validate(&self) -> Result<(), FinnestError> {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(FinnestError::Validation(format!(
                "Rate for {} must be a positive number, got {}",
                self.pair_label(),
                self.rate
            )));
        }
        if self.base == self.quote {
            return Err(FinnestError::Validation(format!(
                "Base and quote must differ: {}",
                self.pair_label()
            )));
        }
        Ok(())
    }

    /// `USD->AUD` style key
    pub fn pair_label(&self) -> String {
        format!("{}->{}", self.base, self.quote)
    }
}

/// Result of asking one external source for a pair
///
/// `rate` is `None` when the provider failed or had no data for the pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderQuote {
    pub provider: String,
    pub label: String,
    pub rate: Option<f64>,
    pub timestamp: Option<String>,
    pub source: String,
}

impl ProviderQuote {
    /// A quote recording that the provider produced nothing usable
    pub fn unavailable(provider: &str, label: &str, source: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            label: label.to_string(),
            rate: None,
            timestamp: None,
            source: source.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.rate.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_rate_must_be_positive() {
        assert!(FxRate::new(code("USD"), code("AUD"), 1.5).is_ok());
        assert!(FxRate::new(code("USD"), code("AUD"), 0.0).is_err());
        assert!(FxRate::new(code("USD"), code("AUD"), -1.0).is_err());
        assert!(FxRate::new(code("USD"), code("AUD"), f64::NAN).is_err());
    }

    #[test]
    fn test_same_pair_rejected() {
        assert!(FxRate::new(code("USD"), code("USD"), 1.0).is_err());
    }

    #[test]
    fn test_quote_json_shape() {
        let quote = ProviderQuote::unavailable("erapi", "ER API", "https://example.test");
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["provider"], "erapi");
        assert!(json["rate"].is_null());
        assert!(json["timestamp"].is_null());
    }
}
