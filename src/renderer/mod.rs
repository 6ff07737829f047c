//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). The probe
//! pipeline depends only on these traits, so tests can drive it with a
//! scripted context instead of a live browser.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A network request that completed during a navigation.
///
/// This is all the extraction engine sees of the network layer: the
/// resolved request URL and the request body, when one was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub url: String,
    pub post_data: Option<String>,
}

/// Errors surfaced by a render context.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("navigation timed out after {0}ms")]
    Timeout(u64),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
}

/// A single browser context (tab).
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Subscribe to completed network requests for this context.
    ///
    /// Must be called before the first navigation; requests that complete
    /// while no subscriber exists are not replayed.
    async fn subscribe_requests(&mut self) -> Result<UnboundedReceiver<RequestRecord>>;

    /// Navigate to a URL, waiting for the load to finish or the timeout.
    async fn navigate(
        &mut self,
        url: &str,
        timeout_ms: u64,
    ) -> Result<NavigationResult, RenderError>;

    /// Reload the current page, waiting for the load to finish or the timeout.
    async fn reload(&mut self, timeout_ms: u64) -> Result<NavigationResult, RenderError>;

    /// Execute JavaScript in the page context and return the result.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, RenderError>;

    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
