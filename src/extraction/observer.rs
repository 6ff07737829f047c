//! Network signal classification.
//!
//! A standing task consumes completed requests for the lifetime of a page
//! session and folds them into the shared [`ExtractionState`]. Every rule
//! here is best-effort: a request that doesn't parse is no signal, never
//! an error.

use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;

use super::scan;
use super::ExtractionState;
use crate::renderer::RequestRecord;

/// URL path pattern of the analytics vendor's tag loader.
const ANALYTICS_TAG_PATTERN: &str = r"(?i)clarity\.ms/tag/([a-z0-9]+)";

/// Substring identifying the ad-pixel collection endpoint.
const PIXEL_ENDPOINT: &str = "facebook.com/tr";

/// Key carrying the analytics tag inside telemetry request bodies.
const ANALYTICS_BODY_KEY: &str = "ms_clarityid";

/// Consume completed requests until the channel closes.
pub async fn run(mut rx: UnboundedReceiver<RequestRecord>, state: Arc<Mutex<ExtractionState>>) {
    while let Some(request) = rx.recv().await {
        let mut state = state.lock().await;
        apply(&mut state, &request);
    }
}

/// Classify one completed request and update extraction state.
pub fn apply(state: &mut ExtractionState, request: &RequestRecord) {
    // 1. Analytics tag from the loader URL. First writer wins.
    if state.analytics_id.is_none() {
        if let Some(id) = match_analytics_tag(&request.url) {
            state.offer_analytics_id(&id);
        }
    }

    // 2. Ad-pixel beacon. Detection is unconditional; the id is best-effort.
    if request.url.contains(PIXEL_ENDPOINT) {
        state.record_pixel_hit();
        if let Some(id) = pixel_id_from_url(&request.url) {
            state.offer_pixel_id(&id);
        }
    }

    // 3. Analytics tag from the request body. Skipped once a tag is known.
    if state.analytics_id.is_none() {
        if let Some(id) = analytics_id_from_body(request.post_data.as_deref()) {
            state.offer_analytics_id(&id);
        }
    }
}

/// Match the analytics tag-loader URL and extract the tag token.
pub fn match_analytics_tag(url: &str) -> Option<String> {
    let re = Regex::new(ANALYTICS_TAG_PATTERN).expect("valid regex");
    re.captures(url).map(|c| c[1].to_string())
}

/// Parse the `id` query parameter from an ad-pixel URL.
///
/// A malformed URL is no signal; the beacon itself was still observed.
fn pixel_id_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Best-effort analytics tag recovery from a structured request body.
fn analytics_id_from_body(post_data: Option<&str>) -> Option<String> {
    let body = post_data?;
    let parsed: Value = serde_json::from_str(body).ok()?;
    scan::find_string_key(&parsed, ANALYTICS_BODY_KEY).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> RequestRecord {
        RequestRecord {
            url: url.to_string(),
            post_data: None,
        }
    }

    fn request_with_body(url: &str, body: &str) -> RequestRecord {
        RequestRecord {
            url: url.to_string(),
            post_data: Some(body.to_string()),
        }
    }

    #[test]
    fn test_analytics_tag_from_url() {
        let mut state = ExtractionState::default();
        apply(&mut state, &request("https://www.clarity.ms/tag/abc123"));
        assert_eq!(state.analytics_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_analytics_tag_idempotent_under_repeated_events() {
        let mut state = ExtractionState::default();
        let req = request("https://www.clarity.ms/tag/abc123");
        apply(&mut state, &req);
        apply(&mut state, &req);
        assert_eq!(state.analytics_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_analytics_tag_first_writer_wins_across_events() {
        let mut state = ExtractionState::default();
        apply(&mut state, &request("https://www.clarity.ms/tag/abc123"));
        apply(&mut state, &request("https://www.clarity.ms/tag/zzz999"));
        assert_eq!(state.analytics_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_pixel_with_id() {
        let mut state = ExtractionState::default();
        apply(&mut state, &request("https://facebook.com/tr?id=998877"));
        assert!(state.pixel_seen);
        assert_eq!(state.pixel_id.as_deref(), Some("998877"));
    }

    #[test]
    fn test_pixel_without_id_still_seen() {
        let mut state = ExtractionState::default();
        apply(&mut state, &request("https://www.facebook.com/tr?ev=PageView"));
        assert!(state.pixel_seen);
        assert_eq!(state.pixel_id, None);
    }

    #[test]
    fn test_pixel_last_writer_wins() {
        let mut state = ExtractionState::default();
        apply(&mut state, &request("https://facebook.com/tr?id=111111"));
        apply(&mut state, &request("https://facebook.com/tr?id=998877"));
        assert!(state.pixel_seen);
        assert_eq!(state.pixel_id.as_deref(), Some("998877"));
    }

    #[test]
    fn test_malformed_pixel_url_swallowed() {
        let mut state = ExtractionState::default();
        apply(&mut state, &request("facebook.com/tr?id=998877"));
        // Unparseable URL: the beacon was seen, the id is lost.
        assert!(state.pixel_seen);
        assert_eq!(state.pixel_id, None);
    }

    #[test]
    fn test_analytics_tag_from_body() {
        let mut state = ExtractionState::default();
        apply(
            &mut state,
            &request_with_body(
                "https://example.com/collect",
                r#"{"settings":{"tracking":{"ms_clarityid":"xyz789"}}}"#,
            ),
        );
        assert_eq!(state.analytics_id.as_deref(), Some("xyz789"));
    }

    #[test]
    fn test_malformed_body_swallowed() {
        let mut state = ExtractionState::default();
        apply(
            &mut state,
            &request_with_body("https://example.com/collect", "not json {{{"),
        );
        assert_eq!(state.analytics_id, None);
    }

    #[test]
    fn test_body_skipped_once_tag_known() {
        let mut state = ExtractionState::default();
        apply(&mut state, &request("https://www.clarity.ms/tag/abc123"));
        apply(
            &mut state,
            &request_with_body(
                "https://example.com/collect",
                r#"{"ms_clarityid":"other"}"#,
            ),
        );
        assert_eq!(state.analytics_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_unrelated_request_is_no_signal() {
        let mut state = ExtractionState::default();
        apply(&mut state, &request("https://example.com/app.js"));
        assert_eq!(state.analytics_id, None);
        assert!(!state.pixel_seen);
        assert_eq!(state.pixel_id, None);
    }
}
