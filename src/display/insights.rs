//! Insight display formatting

use crate::insights::InsightsResponse;

pub fn format_insights(response: &InsightsResponse) -> String {
    if response.insights.is_empty() {
        return format!(
            "Nothing to report yet; add assets first.\n\n{}\n",
            response.disclaimer
        );
    }

    let mut output = String::new();
    for insight in &response.insights {
        output.push_str(&format!("[{}] {}\n", insight.tone, insight.title));
        output.push_str(&format!("  {}\n\n", insight.body));
    }
    output.push_str(response.disclaimer);
    output.push('\n');
    output
}
