//! Concurrent rate comparison across providers
//!
//! Every source is asked at once and all answers are awaited, whatever each
//! one does. A failing source shows up as a quote with no rate; it never fails
//! the comparison.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::settings::FxSettings;
use crate::error::{FinnestError, FinnestResult};
use crate::models::{CurrencyCode, ProviderQuote};

use super::providers::FxProvider;

/// Anything that can quote a currency pair
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Stable machine id (`frankfurter`, `erapi`, ...)
    fn id(&self) -> &str;

    /// Display label
    fn label(&self) -> &str;

    /// Where the quote comes from, safe to show to users
    fn source_url(&self, base: &CurrencyCode, quote: &CurrencyCode) -> String;

    async fn fetch_quote(
        &self,
        client: &Client,
        base: &CurrencyCode,
        quote: &CurrencyCode,
    ) -> FinnestResult<ProviderQuote>;
}

/// Validate a pair as given: exactly three uppercase letters each, distinct
pub fn validate_pair(base: &str, quote: &str) -> FinnestResult<(CurrencyCode, CurrencyCode)> {
    let invalid = || FinnestError::Validation("Invalid currency pair".to_string());

    let base = CurrencyCode::new_strict(base).map_err(|_| invalid())?;
    let quote = CurrencyCode::new_strict(quote).map_err(|_| invalid())?;
    if base == quote {
        return Err(invalid());
    }
    Ok((base, quote))
}

/// Order quotes by rate ascending, unavailable quotes last
///
/// The sort is stable, so equal rates and the unavailable tail keep their
/// source order.
pub fn rank_quotes(mut quotes: Vec<ProviderQuote>) -> Vec<ProviderQuote> {
    quotes.sort_by(|a, b| match (a.rate, b.rate) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    quotes
}

/// Fans a comparison out to every configured source
pub struct FxAggregator {
    sources: Vec<Arc<dyn QuoteSource>>,
    client: Client,
}

impl FxAggregator {
    pub fn new(sources: Vec<Arc<dyn QuoteSource>>, client: Client) -> Self {
        Self { sources, client }
    }

    /// The public providers, plus OpenExchangeRates when an app id is configured
    pub fn from_settings(settings: &FxSettings) -> FinnestResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(concat!("finnest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut sources: Vec<Arc<dyn QuoteSource>> = vec![
            Arc::new(FxProvider::frankfurter()),
            Arc::new(FxProvider::exchangerate_host()),
            Arc::new(FxProvider::open_er_api()),
        ];
        if let Some(app_id) = settings.resolved_app_id() {
            sources.push(Arc::new(FxProvider::openexchangerates(app_id)));
        }

        Ok(Self::new(sources, client))
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.id().to_string()).collect()
    }

    /// Quote `base -> quote` from every source
    ///
    /// Returns one quote per source, ranked. Only an invalid pair is an error,
    /// and it is reported before any request is made.
    pub async fn compare(&self, base: &str, quote: &str) -> FinnestResult<Vec<ProviderQuote>> {
        let (base, quote) = validate_pair(base, quote)?;

        let requests = self.sources.iter().map(|source| {
            let (base, quote) = (&base, &quote);
            async move {
                match source.fetch_quote(&self.client, base, quote).await {
                    Ok(q) => q,
                    Err(e) => {
                        warn!(provider = source.id(), error = %e, "rate provider failed");
                        ProviderQuote::unavailable(
                            source.id(),
                            source.label(),
                            source.source_url(base, quote),
                        )
                    }
                }
            }
        });

        let quotes = join_all(requests).await;
        let available = quotes.iter().filter(|q| q.is_available()).count();
        info!(%base, %quote, available, total = quotes.len(), "compared FX providers");

        Ok(rank_quotes(quotes))
    }
}
