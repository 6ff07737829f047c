//! Campaign-attribution token recovery from debug-mode page text.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tokens exposed by the attribution-mode page render.
///
/// Built fresh per attribution load and discarded when that load fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub portfolio_id: Option<String>,
    pub source_tag: Option<String>,
}

/// Parse attribution tokens out of the page's visible text.
///
/// The two patterns are independent: either can match without the other.
pub fn parse(text: &str) -> AttributionResult {
    let portfolio_re =
        Regex::new(r"(?i)portfolio[_\s\-]?id[:=]?\s*([a-zA-Z0-9\-]+)").expect("valid regex");
    let source_re = Regex::new(r"(?i)src=([a-zA-Z0-9\-_]+)").expect("valid regex");

    AttributionResult {
        portfolio_id: portfolio_re.captures(text).map(|c| c[1].to_string()),
        source_tag: source_re.captures(text).map(|c| c[1].to_string()),
    }
}
