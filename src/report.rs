// Copyright 2026 Tagprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! The session report: fixed shape, every field independently optional.

use serde::{Deserialize, Serialize};

use crate::extraction::links::LinkEntry;

/// Everything a probe run recovered about one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub url: String,
    pub analytics_id: Option<String>,
    pub pixel_seen: bool,
    pub pixel_id: Option<String>,
    pub links: Vec<LinkEntry>,
    pub referral_url: Option<String>,
    pub portfolio_id: Option<String>,
    pub source_tag: Option<String>,
}

impl SessionReport {
    /// Render the human-readable console report.
    ///
    /// The shape is fixed: fields that were never recovered render as an
    /// explicit "not found" marker rather than being omitted.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("URL tested: {}\n\n", self.url));

        match &self.analytics_id {
            Some(id) => out.push_str(&format!("Analytics tag: {id}\n")),
            None => out.push_str("Analytics tag: not found\n"),
        }

        match (&self.pixel_id, self.pixel_seen) {
            (Some(id), _) => out.push_str(&format!("Ad pixel:      {id}\n")),
            (None, true) => out.push_str("Ad pixel:      detected (no id)\n"),
            (None, false) => out.push_str("Ad pixel:      not found\n"),
        }

        match &self.referral_url {
            Some(url) => out.push_str(&format!("Referral URL:  {url}\n")),
            None => out.push_str("Referral URL:  not found\n"),
        }

        match &self.portfolio_id {
            Some(id) => out.push_str(&format!("Portfolio id:  {id}\n")),
            None => out.push_str("Portfolio id:  not found\n"),
        }

        match &self.source_tag {
            Some(tag) => out.push_str(&format!("Source tag:    {tag}\n")),
            None => out.push_str("Source tag:    not found\n"),
        }

        out.push_str(&format!("\nFooter links ({}):\n", self.links.len()));
        for (i, link) in self.links.iter().enumerate() {
            let text = link
                .text
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("(no text)");
            out.push_str(&format!("  {}. [{}] {}\n", i + 1, text, link.href));
        }

        out
    }
}
