// Copyright 2026 Tagprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Session orchestration: three sequenced page loads feeding one report.
//!
//! Phase 1 loads the page, phase 2 forces a reload (cached tag loaders
//! re-execute and fire requests they skipped the first time), phase 3
//! revisits the page in attribution mode. No phase failure is fatal; the
//! run always produces a complete report.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::extraction::attribution::{self, AttributionResult};
use crate::extraction::{fallback, links, observer, ExtractionState};
use crate::renderer::RenderContext;
use crate::report::SessionReport;

/// Query parameter that switches the page into attribution mode.
const ATTRIBUTION_PARAM: &str = "test";

/// Visible-text read used by the attribution phase.
const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

/// Timing knobs for a probe run.
///
/// The settle delays give asynchronous trackers time to fire after the
/// load event; they double as the quiesce point before extraction state
/// is read, so zero is only safe in tests that control request delivery.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Per-navigation timeout.
    pub nav_timeout_ms: u64,
    /// Wait after the phase 1 and 2 navigations.
    pub settle_ms: u64,
    /// Wait after the attribution navigation.
    pub attribution_settle_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            nav_timeout_ms: 60_000,
            settle_ms: 5_000,
            attribution_settle_ms: 3_000,
        }
    }
}

/// A single-page probe session.
pub struct Probe {
    base_url: String,
    config: ProbeConfig,
}

impl Probe {
    pub fn new(base_url: impl Into<String>, config: ProbeConfig) -> Self {
        Self {
            base_url: base_url.into(),
            config,
        }
    }

    /// Derive the attribution-mode variant of the base URL.
    pub fn attribution_url(&self) -> String {
        if self.base_url.contains('?') {
            format!("{}&{ATTRIBUTION_PARAM}", self.base_url)
        } else {
            format!("{}?{ATTRIBUTION_PARAM}", self.base_url)
        }
    }

    /// Drive the full three-phase session and assemble the report.
    pub async fn run(&self, ctx: &mut dyn RenderContext) -> Result<SessionReport> {
        let state = Arc::new(Mutex::new(ExtractionState::default()));

        let requests = ctx.subscribe_requests().await?;
        tokio::spawn(observer::run(requests, Arc::clone(&state)));

        // Phase 1: primary load.
        if let Err(e) = ctx
            .navigate(&self.base_url, self.config.nav_timeout_ms)
            .await
        {
            warn!("primary load failed: {e}");
        }
        self.settle(self.config.settle_ms).await;

        // Phase 2: forced reload.
        if let Err(e) = ctx.reload(self.config.nav_timeout_ms).await {
            warn!("forced reload failed: {e}");
        }
        self.settle(self.config.settle_ms).await;

        let fallback_ids = fallback::extract(ctx).await;
        let footer_links = links::harvest(ctx).await;
        let referral_url = links::find_referral(ctx).await;

        {
            let mut state = state.lock().await;
            state.fill_from_fallback(&fallback_ids);
        }

        // Phase 3: attribution load. Reuses the session but must not
        // disturb the state accumulated above.
        let mut tokens = AttributionResult::default();
        match ctx
            .navigate(&self.attribution_url(), self.config.nav_timeout_ms)
            .await
        {
            Ok(_) => {
                self.settle(self.config.attribution_settle_ms).await;
                match ctx.evaluate(BODY_TEXT_JS).await {
                    Ok(value) => {
                        tokens = attribution::parse(value.as_str().unwrap_or(""));
                    }
                    Err(e) => warn!("attribution text read failed: {e}"),
                }
            }
            Err(e) => warn!("attribution load failed: {e}"),
        }

        let state = state.lock().await.clone();
        debug!(
            analytics = state.analytics_id.is_some(),
            pixel = state.pixel_id.is_some(),
            links = footer_links.len(),
            "probe complete"
        );

        Ok(SessionReport {
            url: self.base_url.clone(),
            analytics_id: state.analytics_id,
            pixel_seen: state.pixel_seen,
            pixel_id: state.pixel_id,
            links: footer_links,
            referral_url,
            portfolio_id: tokens.portfolio_id,
            source_tag: tokens.source_tag,
        })
    }

    async fn settle(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}
