//! OpenAI-compatible chat completion client for insights

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::settings::InsightsSettings;
use crate::crypto::SecureString;
use crate::error::{FinnestError, FinnestResult};

use super::summary::{round_half_up, FeatureSummary};

const SYSTEM_PROMPT: &str = "You are a regulated FinNest assistant. Summarize the datasets \
(assets, liabilities, emergency contacts, documents, insurance) in neutral, observational \
language. Highlight missing contacts, upcoming insurance renewals (30 days or sooner), and \
other noteworthy ratios. Do not issue recommendations (no buy/sell/invest/should/must) and \
avoid financial-advice wording.";

const TEMPERATURE: f64 = 0.4;

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Client for one chat model
pub struct LlmClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: SecureString,
}

impl LlmClient {
    pub fn new(client: Client, api_base: &str, model: &str, api_key: SecureString) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn from_settings(settings: &InsightsSettings, api_key: SecureString) -> FinnestResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self::new(client, &settings.api_base, &settings.model, api_key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model for raw insight items
    ///
    /// A reply that is not JSON yields no items; transport failures and
    /// non-success statuses are errors.
    pub async fn generate(&self, summary: &FeatureSummary) -> FinnestResult<Vec<Value>> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(summary)},
            ],
            "temperature": TEMPERATURE,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(FinnestError::Insights(format!(
                "completion request failed with {}: {}",
                status, text
            )));
        }

        let completion: Completion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_else(|| "{}".to_string());

        let items = parse_items(&content);
        debug!(model = %self.model, items = items.len(), "received completion");
        Ok(items)
    }
}

/// Accept `{ "insights": [...] }` or a bare array
pub fn parse_items(content: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Object(mut map)) => match map.remove("insights") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn buckets_json(buckets: &[(String, f64)]) -> String {
    let map: serde_json::Map<String, Value> = buckets
        .iter()
        .map(|(k, v)| (k.clone(), json!(v)))
        .collect();
    Value::Object(map).to_string()
}

fn user_prompt(summary: &FeatureSummary) -> String {
    let insurance = match summary.insurance_count {
        0 => "no policies".to_string(),
        1 => "1 policy".to_string(),
        n => format!("{} policies", n),
    };
    let renewal = summary
        .soonest_insurance
        .as_ref()
        .map(|r| format!("; soonest renewal in {} day(s)", r.days))
        .unwrap_or_default();

    [
        format!("Snapshot (display currency {}):", summary.display_currency),
        format!(
            "Assets: total {}, by type {}, top {}.",
            round_half_up(summary.total),
            buckets_json(&summary.by_type),
            summary.top.as_deref().unwrap_or("N/A")
        ),
        format!(
            "Liabilities: total {}, by type {}.",
            round_half_up(summary.liability_total),
            buckets_json(&summary.liability_by_type)
        ),
        format!("Emergency contacts: {}.", summary.contact_count),
        format!("Documents stored: {}.", summary.documents_count),
        format!("Insurance: {}{}.", insurance, renewal),
        "Generate 3-4 concise insights that tie directly to the numbers above. Mark tone per \
         item as Positive, Suggestion, Attention, or Insight. Return a JSON array of \
         {title,tone,body}."
            .to_string(),
    ]
    .join("\n")
}
