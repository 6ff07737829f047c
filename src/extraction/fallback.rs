//! DOM fallback recovery for identifiers the network layer missed.
//!
//! Runs a script against the rendered page that inspects `<script>` tags:
//! the analytics tag can still be read off the loader's src attribute, and
//! the pixel id off the inline bootstrap call, even when the matching
//! network requests were never observed. Absence of a match is a null
//! field, never an error.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::renderer::RenderContext;

/// Identifiers recovered from the rendered DOM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackIds {
    pub analytics: Option<String>,
    pub pixel: Option<String>,
}

/// Script-tag scan, evaluated inside the page.
const FALLBACK_JS: &str = r#"
(() => {
  const result = { analytics: null, pixel: null };
  try {
    const scripts = Array.from(document.querySelectorAll('script'));
    for (const script of scripts) {
      if (!result.analytics && script.src && script.src.includes('clarity.ms/tag/')) {
        const match = script.src.match(/clarity\.ms\/tag\/([a-z0-9]+)/i);
        if (match) result.analytics = match[1];
      }
      if (!result.pixel && script.innerText.includes("fbq('init'")) {
        const match = script.innerText.match(/fbq\(['"]init['"],\s*['"](\d{5,})['"]\)/);
        if (match) result.pixel = match[1];
      }
    }
  } catch (e) {}
  return result;
})()
"#;

/// Inspect the rendered page for identifiers the network layer missed.
///
/// Evaluation failure is treated like a failed navigation: logged as a
/// warning and recovered with an empty result.
pub async fn extract(ctx: &dyn RenderContext) -> FallbackIds {
    match ctx.evaluate(FALLBACK_JS).await {
        Ok(value) => parse(value),
        Err(e) => {
            warn!("DOM fallback evaluation failed: {e}");
            FallbackIds::default()
        }
    }
}

/// Parse an evaluation result leniently: anything malformed is an empty set.
pub fn parse(value: serde_json::Value) -> FallbackIds {
    serde_json::from_value(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_both_ids() {
        let ids = parse(json!({ "analytics": "abc123", "pixel": "998877" }));
        assert_eq!(ids.analytics.as_deref(), Some("abc123"));
        assert_eq!(ids.pixel.as_deref(), Some("998877"));
    }

    #[test]
    fn test_parse_null_fields() {
        let ids = parse(json!({ "analytics": null, "pixel": null }));
        assert_eq!(ids.analytics, None);
        assert_eq!(ids.pixel, None);
    }

    #[test]
    fn test_parse_malformed_result_is_empty() {
        let ids = parse(json!("unexpected"));
        assert_eq!(ids.analytics, None);
        assert_eq!(ids.pixel, None);

        let ids = parse(serde_json::Value::Null);
        assert_eq!(ids.analytics, None);
        assert_eq!(ids.pixel, None);
    }
}
