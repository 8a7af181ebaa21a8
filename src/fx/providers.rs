//! Public FX rate providers
//!
//! Each provider speaks its own JSON dialect. [`FxProvider`] is a closed set of
//! adapters; adding a provider means adding a variant, never branching on
//! response shape in shared code.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::error::{FinnestError, FinnestResult};
use crate::models::{CurrencyCode, ProviderQuote};

use super::aggregator::QuoteSource;

pub const FRANKFURTER_URL: &str = "https://api.frankfurter.app";
pub const EXCHANGERATE_HOST_URL: &str = "https://api.exchangerate.host";
pub const OPEN_ER_API_URL: &str = "https://open.er-api.com";
pub const OPENEXCHANGERATES_URL: &str = "https://openexchangerates.org";

/// A configured rate provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FxProvider {
    /// ECB reference rates via frankfurter.app
    Frankfurter { base_url: String },
    ExchangeRateHost { base_url: String },
    /// open.er-api.com
    OpenErApi { base_url: String },
    /// USD-based rates; other pairs are crossed through USD
    OpenExchangeRates { base_url: String, app_id: String },
}

/// `{ rates: {...}, date }` as returned by Frankfurter and ExchangeRate.host
#[derive(Debug, Deserialize)]
struct DatedRates {
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErApiRates {
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(default)]
    time_last_update_utc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OxrRates {
    #[serde(default)]
    rates: HashMap<String, f64>,
    /// Unix seconds
    #[serde(default)]
    timestamp: Option<i64>,
}

impl FxProvider {
    pub fn frankfurter() -> Self {
        Self::Frankfurter {
            base_url: FRANKFURTER_URL.to_string(),
        }
    }

    pub fn exchangerate_host() -> Self {
        Self::ExchangeRateHost {
            base_url: EXCHANGERATE_HOST_URL.to_string(),
        }
    }

    pub fn open_er_api() -> Self {
        Self::OpenErApi {
            base_url: OPEN_ER_API_URL.to_string(),
        }
    }

    pub fn openexchangerates(app_id: impl Into<String>) -> Self {
        Self::OpenExchangeRates {
            base_url: OPENEXCHANGERATES_URL.to_string(),
            app_id: app_id.into(),
        }
    }

    /// Point the adapter at another host (tests, proxies)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        match &mut self {
            Self::Frankfurter { base_url }
            | Self::ExchangeRateHost { base_url }
            | Self::OpenErApi { base_url }
            | Self::OpenExchangeRates { base_url, .. } => *base_url = url,
        }
        self
    }

    fn base_url(&self) -> &str {
        match self {
            Self::Frankfurter { base_url }
            | Self::ExchangeRateHost { base_url }
            | Self::OpenErApi { base_url }
            | Self::OpenExchangeRates { base_url, .. } => base_url.trim_end_matches('/'),
        }
    }

    /// Build the request URL; the app id is only included when `with_secret`
    fn endpoint(
        &self,
        base: &CurrencyCode,
        quote: &CurrencyCode,
        with_secret: bool,
    ) -> FinnestResult<Url> {
        let root = self.base_url();
        let parsed = match self {
            Self::Frankfurter { .. } => Url::parse_with_params(
                &format!("{}/latest", root),
                &[("from", base.as_str()), ("to", quote.as_str())],
            ),
            Self::ExchangeRateHost { .. } => Url::parse_with_params(
                &format!("{}/latest", root),
                &[("base", base.as_str()), ("symbols", quote.as_str())],
            ),
            Self::OpenErApi { .. } => Url::parse(&format!("{}/v6/latest/{}", root, base)),
            Self::OpenExchangeRates { app_id, .. } => {
                let symbols = format!("{},{}", base, quote);
                let mut params = Vec::with_capacity(2);
                if with_secret {
                    params.push(("app_id", app_id.as_str()));
                }
                params.push(("symbols", symbols.as_str()));
                Url::parse_with_params(&format!("{}/api/latest.json", root), &params)
            }
        };
        parsed.map_err(|e| FinnestError::Provider(format!("{}: invalid URL: {}", self.id(), e)))
    }

    /// Extract the pair's rate and as-of timestamp from a response body
    fn parse(
        &self,
        body: &[u8],
        base: &CurrencyCode,
        quote: &CurrencyCode,
    ) -> FinnestResult<(Option<f64>, Option<String>)> {
        let bad_body =
            |e: serde_json::Error| FinnestError::Provider(format!("{}: bad response: {}", self.id(), e));

        let (rate, timestamp) = match self {
            Self::Frankfurter { .. } | Self::ExchangeRateHost { .. } => {
                let parsed: DatedRates = serde_json::from_slice(body).map_err(bad_body)?;
                (parsed.rates.get(quote.as_str()).copied(), parsed.date)
            }
            Self::OpenErApi { .. } => {
                let parsed: ErApiRates = serde_json::from_slice(body).map_err(bad_body)?;
                (
                    parsed.rates.get(quote.as_str()).copied(),
                    parsed.time_last_update_utc,
                )
            }
            Self::OpenExchangeRates { .. } => {
                let parsed: OxrRates = serde_json::from_slice(body).map_err(bad_body)?;
                let timestamp = parsed
                    .timestamp
                    .and_then(|secs| DateTime::from_timestamp(secs, 0))
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true));
                (usd_cross_rate(&parsed.rates, base, quote), timestamp)
            }
        };

        Ok((rate.filter(|r| r.is_finite() && *r > 0.0), timestamp))
    }
}

/// Derive base->quote from USD-based rates
fn usd_cross_rate(
    rates: &HashMap<String, f64>,
    base: &CurrencyCode,
    quote: &CurrencyCode,
) -> Option<f64> {
    let r_base = rates.get(base.as_str()).copied();
    let r_quote = rates.get(quote.as_str()).copied();

    if base.is_usd() {
        r_quote
    } else if quote.is_usd() {
        r_base.map(|b| 1.0 / b)
    } else {
        Some(r_quote? / r_base?)
    }
}

#[async_trait]
impl QuoteSource for FxProvider {
    fn id(&self) -> &str {
        match self {
            Self::Frankfurter { .. } => "frankfurter",
            Self::ExchangeRateHost { .. } => "exchangerate_host",
            Self::OpenErApi { .. } => "erapi",
            Self::OpenExchangeRates { .. } => "openexchangerates",
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::Frankfurter { .. } => "ECB (Frankfurter)",
            Self::ExchangeRateHost { .. } => "ExchangeRate.host",
            Self::OpenErApi { .. } => "ER API",
            Self::OpenExchangeRates { .. } => "OpenExchangeRates",
        }
    }

    fn source_url(&self, base: &CurrencyCode, quote: &CurrencyCode) -> String {
        self.endpoint(base, quote, false)
            .map(String::from)
            .unwrap_or_else(|_| self.base_url().to_string())
    }

    async fn fetch_quote(
        &self,
        client: &Client,
        base: &CurrencyCode,
        quote: &CurrencyCode,
    ) -> FinnestResult<ProviderQuote> {
        let url = self.endpoint(base, quote, true)?;
        debug!(provider = self.id(), %base, %quote, "requesting rate");

        let resp = client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FinnestError::Provider(format!(
                "{} returned HTTP {}",
                self.id(),
                status
            )));
        }

        let body = resp.bytes().await?;
        let (rate, timestamp) = self.parse(&body, base, quote)?;

        Ok(ProviderQuote {
            provider: self.id().to_string(),
            label: self.label().to_string(),
            rate,
            timestamp,
            source: self.source_url(base, quote),
        })
    }
}
