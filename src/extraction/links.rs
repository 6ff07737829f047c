//! Footer link harvesting and referral ad-link discovery.
//!
//! Independent of the identifier pipeline, but shares the page session:
//! both run against the rendered DOM once the main loads have settled.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::renderer::RenderContext;

/// An anchor harvested from a footer region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub text: Option<String>,
    pub href: String,
}

/// Anchor collection from footer-like regions, evaluated inside the page.
///
/// Regions: the semantic footer element, every element with "footer" in
/// its class attribute, and the `.footer-links` container. Deduplication
/// happens on the Rust side.
const FOOTER_LINKS_JS: &str = r#"
(() => {
  const anchors = [];
  try {
    const collect = (container) => {
      if (!container) return;
      for (const a of container.querySelectorAll('a')) {
        anchors.push({
          text: a.textContent ? a.textContent.trim() : null,
          href: a.href ? a.href.trim() : '',
        });
      }
    };
    collect(document.querySelector('footer'));
    document.querySelectorAll('[class*="footer"]').forEach(collect);
    collect(document.querySelector('.footer-links'));
  } catch (e) {}
  return anchors;
})()
"#;

/// First anchor that looks like a traffic-referral ad link.
const REFERRAL_JS: &str = r#"
(() => {
  try {
    const link = document.querySelector('a[href*="trf"]');
    return link ? link.href : null;
  } catch (e) {
    return null;
  }
})()
"#;

/// Harvest deduplicated footer links from the rendered page.
pub async fn harvest(ctx: &dyn RenderContext) -> Vec<LinkEntry> {
    match ctx.evaluate(FOOTER_LINKS_JS).await {
        Ok(value) => dedup(parse(value)),
        Err(e) => {
            warn!("footer link harvest failed: {e}");
            Vec::new()
        }
    }
}

/// Find the first referral ("trf") ad link, if the page carries one.
pub async fn find_referral(ctx: &dyn RenderContext) -> Option<String> {
    match ctx.evaluate(REFERRAL_JS).await {
        Ok(value) => value
            .as_str()
            .map(str::to_string)
            .filter(|s| !s.is_empty()),
        Err(e) => {
            warn!("referral link lookup failed: {e}");
            None
        }
    }
}

/// Lenient parse of the raw anchor list.
pub fn parse(value: serde_json::Value) -> Vec<LinkEntry> {
    serde_json::from_value(value).unwrap_or_default()
}

/// Drop anchors without a resolved href and deduplicate by (text, href),
/// keeping first-seen order.
pub fn dedup(raw: Vec<LinkEntry>) -> Vec<LinkEntry> {
    let mut links: Vec<LinkEntry> = Vec::new();
    for entry in raw {
        if entry.href.is_empty() {
            continue;
        }
        if !links.contains(&entry) {
            links.push(entry);
        }
    }
    links
}
