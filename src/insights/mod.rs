//! Portfolio insights
//!
//! A short list of observational notes about a household snapshot, written
//! by a language model when one is configured and computed locally otherwise.
//! All wording passes through [`sanitize`] so nothing reads as advice.

pub mod fallback;
pub mod llm;
pub mod request;
pub mod sanitize;
pub mod service;
pub mod summary;

pub use fallback::build_fallback_insights;
pub use llm::LlmClient;
pub use request::InsightsRequest;
pub use sanitize::{normalize_text, to_safe_insights, Insight, DISCLAIMER};
pub use service::{InsightSource, InsightsResponse, InsightsService};
pub use summary::FeatureSummary;
