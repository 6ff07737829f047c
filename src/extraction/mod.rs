// Copyright 2026 Tagprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Multi-source identifier extraction.
//!
//! Network-observed signals land in [`ExtractionState`] via the observer
//! task; DOM-derived fallbacks fill whatever the network layer missed.
//! Precedence is fixed: a network value is never overwritten by a fallback.

pub mod attribution;
pub mod fallback;
pub mod links;
pub mod observer;
pub mod scan;

use self::fallback::FallbackIds;

/// Signals accumulated while a page session is live.
///
/// One instance per session. The observer task is the only writer during
/// the network-reactive phase; the orchestrator merges fallbacks after the
/// page settles and then treats the state as read-only. Each field has its
/// own write rule, enforced by the offer methods below — callers never
/// assign fields directly.
#[derive(Debug, Default, Clone)]
pub struct ExtractionState {
    /// Analytics session tag. First writer wins; never cleared.
    pub analytics_id: Option<String>,
    /// Whether an ad-pixel call was observed at all, with or without an id.
    pub pixel_seen: bool,
    /// Ad-pixel account id. Last successful parse wins.
    pub pixel_id: Option<String>,
}

impl ExtractionState {
    /// Offer an analytics tag. Only the first non-empty offer is kept.
    pub fn offer_analytics_id(&mut self, id: &str) {
        if self.analytics_id.is_none() && !id.is_empty() {
            self.analytics_id = Some(id.to_string());
        }
    }

    /// Record that an ad-pixel call was observed, id or not.
    pub fn record_pixel_hit(&mut self) {
        self.pixel_seen = true;
    }

    /// Offer an ad-pixel id. Later offers replace earlier ones.
    ///
    /// A known id implies a seen pixel, so this also raises `pixel_seen`.
    pub fn offer_pixel_id(&mut self, id: &str) {
        if !id.is_empty() {
            self.pixel_seen = true;
            self.pixel_id = Some(id.to_string());
        }
    }

    /// Fill gaps from DOM fallbacks. Network-observed values always win.
    pub fn fill_from_fallback(&mut self, fallback: &FallbackIds) {
        if let Some(id) = &fallback.analytics {
            self.offer_analytics_id(id);
        }
        if self.pixel_id.is_none() {
            if let Some(id) = &fallback.pixel {
                self.offer_pixel_id(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_first_writer_wins() {
        let mut state = ExtractionState::default();
        state.offer_analytics_id("abc123");
        state.offer_analytics_id("def456");
        assert_eq!(state.analytics_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_empty_analytics_offer_ignored() {
        let mut state = ExtractionState::default();
        state.offer_analytics_id("");
        assert_eq!(state.analytics_id, None);
        state.offer_analytics_id("abc123");
        assert_eq!(state.analytics_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_pixel_last_writer_wins_and_implies_seen() {
        let mut state = ExtractionState::default();
        state.offer_pixel_id("111111");
        state.offer_pixel_id("998877");
        assert_eq!(state.pixel_id.as_deref(), Some("998877"));
        assert!(state.pixel_seen);
    }

    #[test]
    fn test_pixel_hit_without_id() {
        let mut state = ExtractionState::default();
        state.record_pixel_hit();
        assert!(state.pixel_seen);
        assert_eq!(state.pixel_id, None);
    }

    #[test]
    fn test_fallback_fills_gaps_only() {
        let mut state = ExtractionState::default();
        state.offer_analytics_id("network");
        state.fill_from_fallback(&FallbackIds {
            analytics: Some("dom".to_string()),
            pixel: Some("112233".to_string()),
        });
        assert_eq!(state.analytics_id.as_deref(), Some("network"));
        assert_eq!(state.pixel_id.as_deref(), Some("112233"));
        assert!(state.pixel_seen);
    }

    #[test]
    fn test_fallback_pixel_never_overwrites_network_pixel() {
        let mut state = ExtractionState::default();
        state.offer_pixel_id("998877");
        state.fill_from_fallback(&FallbackIds {
            analytics: None,
            pixel: Some("112233".to_string()),
        });
        assert_eq!(state.pixel_id.as_deref(), Some("998877"));
    }
}
