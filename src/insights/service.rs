//! Insight generation with local fallback

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::settings::{InsightsSettings, OPENAI_API_KEY_ENV};
use crate::crypto::SecureString;
use crate::error::FinnestResult;

use super::fallback::build_fallback_insights;
use super::llm::LlmClient;
use super::request::InsightsRequest;
use super::sanitize::{to_safe_insights, Insight, DISCLAIMER, MAX_INSIGHTS};
use super::summary::FeatureSummary;

/// Where the returned items came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Llm,
    Fallback,
    Mixed,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightsResponse {
    pub ok: bool,
    pub insights: Vec<Insight>,
    pub source: InsightSource,
    pub disclaimer: &'static str,
}

/// Produces at most three safe insights for a request
pub struct InsightsService {
    llm: Option<LlmClient>,
}

impl InsightsService {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    /// Local-only generator
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Uses the model when `OPENAI_API_KEY` is set
    pub fn from_settings(settings: &InsightsSettings) -> FinnestResult<Self> {
        let llm = match std::env::var(OPENAI_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => {
                Some(LlmClient::from_settings(settings, SecureString::new(key))?)
            }
            _ => None,
        };
        Ok(Self::new(llm))
    }

    pub fn has_model(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn generate(&self, request: &InsightsRequest) -> InsightsResponse {
        self.generate_at(request, Utc::now()).await
    }

    /// Model items first, topped up with distinct local items
    pub async fn generate_at(
        &self,
        request: &InsightsRequest,
        now: DateTime<Utc>,
    ) -> InsightsResponse {
        let summary = FeatureSummary::from_request(request, now);

        let mut insights = match &self.llm {
            Some(llm) => match llm.generate(&summary).await {
                Ok(raw) => to_safe_insights(&raw),
                Err(e) => {
                    warn!(error = %e, "insight model failed, using local insights");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        let from_model = insights.len();

        for candidate in build_fallback_insights(&summary) {
            if insights.len() >= MAX_INSIGHTS {
                break;
            }
            if insights.iter().any(|i| i.same_as(&candidate)) {
                continue;
            }
            insights.push(candidate);
        }

        let source = match (from_model, insights.len() - from_model) {
            (0, _) => InsightSource::Fallback,
            (_, 0) => InsightSource::Llm,
            _ => InsightSource::Mixed,
        };
        info!(count = insights.len(), ?source, "generated insights");

        InsightsResponse {
            ok: true,
            insights,
            source,
            disclaimer: DISCLAIMER,
        }
    }
}
