//! Wording guard for generated insights
//!
//! Directive verbs are softened into observational phrasing and items that
//! read as advice or promises are dropped.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Most items returned to a caller
pub const MAX_INSIGHTS: usize = 3;

/// Attached to every insight response
pub const DISCLAIMER: &str = "Informational only - not financial advice.";

/// One observation shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    /// `Positive`, `Suggestion`, `Attention` or `Insight`
    pub tone: String,
    pub body: String,
}

impl Insight {
    pub fn new(title: &str, tone: &str, body: &str) -> Self {
        Self {
            title: normalize_text(title),
            tone: tone.to_string(),
            body: normalize_text(body),
        }
    }

    /// Same title and body
    pub fn same_as(&self, other: &Insight) -> bool {
        self.title == other.title && self.body == other.body
    }
}

struct Rules {
    whitespace: Regex,
    prohibited: Regex,
    replacements: Vec<(Regex, &'static str)>,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("static pattern");
        Rules {
            whitespace: re(r"\s+"),
            prohibited: re(r"(?i)\b(financial advice|guaranteed|guarantee?)\b"),
            replacements: vec![
                (
                    re(r"(?i)\b(buy|sell|trade|short|rebalance|allocate|recommend)\b"),
                    "consider",
                ),
                (re(r"(?i)\binvest(ing)?\b"), "consider expanding exposure"),
                (re(r"(?i)\bshould\b"), "could"),
                (re(r"(?i)\bmust\b"), "should consider"),
            ],
        }
    })
}

/// Collapse whitespace, then soften directive wording
///
/// Replacements run in order, so `must` ends up as `should consider` and is
/// not rewritten again.
pub fn normalize_text(value: &str) -> String {
    let rules = rules();
    let mut text = rules.whitespace.replace_all(value, " ").trim().to_string();
    for (pattern, replacement) in &rules.replacements {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

/// True when the text reads as advice or a promise
pub fn is_prohibited(text: &str) -> bool {
    rules().prohibited.is_match(text)
}

/// Turn raw generated items into at most [`MAX_INSIGHTS`] safe insights
pub fn to_safe_insights(items: &[Value]) -> Vec<Insight> {
    let mut safe = Vec::new();
    for raw in items {
        let title = normalize_text(
            &text_field(raw, "title").unwrap_or_else(|| "Portfolio insight".to_string()),
        );
        let tone = raw
            .get("tone")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Insight")
            .to_string();
        let body = normalize_text(&text_field(raw, "body").unwrap_or_default());
        if body.is_empty() {
            continue;
        }
        if is_prohibited(&format!("{} {}", title, body)) {
            continue;
        }

        safe.push(Insight { title, tone, body });
        if safe.len() >= MAX_INSIGHTS {
            break;
        }
    }
    safe
}

fn text_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
