//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, RenderContext, RenderError, Renderer, RequestRecord};
use crate::stealth;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFinished, EventRequestWillBeSent, RequestId, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, ReloadParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. TAGPROBE_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("TAGPROBE_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.tagprobe/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".tagprobe/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".tagprobe/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".tagprobe/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".tagprobe/chromium/chrome-linux64/chrome"),
                home.join(".tagprobe/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
}

impl ChromiumRenderer {
    /// Create a new ChromiumRenderer, launching a headless Chromium instance.
    pub async fn new() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Install Chrome/Chromium or set TAGPROBE_CHROMIUM_PATH.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-blink-features=AutomationControlled")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self { browser })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        let ua = SetUserAgentOverrideParams::builder()
            .user_agent(stealth::USER_AGENT)
            .accept_language(stealth::ACCEPT_LANGUAGE)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build user-agent override: {e}"))?;
        page.set_user_agent(ua)
            .await
            .context("failed to set user agent")?;

        let init_script = AddScriptToEvaluateOnNewDocumentParams::builder()
            .source(stealth::WEBDRIVER_OVERRIDE)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build init script: {e}"))?;
        page.execute(init_script)
            .await
            .context("failed to install init script")?;

        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser is dropped when ChromiumRenderer is dropped
        Ok(())
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn subscribe_requests(&mut self) -> Result<mpsc::UnboundedReceiver<RequestRecord>> {
        let mut will_be_sent = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .context("failed to listen for request events")?;
        let mut finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .context("failed to listen for loading events")?;

        let (tx, rx) = mpsc::unbounded_channel();

        // Join RequestWillBeSent (URL + body) with LoadingFinished on the
        // CDP request id; one record per completed request.
        tokio::spawn(async move {
            let mut pending: HashMap<RequestId, RequestRecord> = HashMap::new();
            loop {
                tokio::select! {
                    ev = will_be_sent.next() => {
                        let Some(ev) = ev else { break };
                        pending.insert(
                            ev.request_id.clone(),
                            RequestRecord {
                                url: ev.request.url.clone(),
                                post_data: ev.request.post_data_entries.as_ref().map(
                                    |entries| {
                                        entries
                                            .iter()
                                            .filter_map(|e| e.bytes.clone())
                                            .map(String::from)
                                            .collect::<String>()
                                    },
                                ),
                            },
                        );
                    }
                    ev = finished.next() => {
                        let Some(ev) = ev else { break };
                        if let Some(record) = pending.remove(&ev.request_id) {
                            if tx.send(record).is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn navigate(
        &mut self,
        url: &str,
        timeout_ms: u64,
    ) -> Result<NavigationResult, RenderError> {
        let start = Instant::now();

        let result = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, CdpError>(())
        })
        .await;

        match result {
            Ok(Ok(())) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());
                Ok(NavigationResult {
                    final_url,
                    load_time_ms: start.elapsed().as_millis() as u64,
                })
            }
            Ok(Err(e)) => Err(RenderError::Navigation(e.to_string())),
            Err(_) => Err(RenderError::Timeout(timeout_ms)),
        }
    }

    async fn reload(&mut self, timeout_ms: u64) -> Result<NavigationResult, RenderError> {
        let start = Instant::now();

        let result = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            self.page.execute(ReloadParams::default()).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, CdpError>(())
        })
        .await;

        match result {
            Ok(Ok(())) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_default();
                Ok(NavigationResult {
                    final_url,
                    load_time_ms: start.elapsed().as_millis() as u64,
                })
            }
            Ok(Err(e)) => Err(RenderError::Navigation(e.to_string())),
            Err(_) => Err(RenderError::Timeout(timeout_ms)),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, RenderError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| RenderError::Evaluation(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| RenderError::Evaluation(format!("{e:?}")))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let _ = self.page.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_navigate_and_evaluate() {
        let renderer = ChromiumRenderer::new()
            .await
            .expect("failed to create renderer");
        let mut ctx = renderer
            .new_context()
            .await
            .expect("failed to create context");

        let nav = ctx
            .navigate("data:text/html,<h1>Hello</h1><p>World</p>", 10000)
            .await
            .expect("navigation failed");

        assert!(nav.load_time_ms < 10000);

        let result = ctx
            .evaluate("document.querySelector('h1').textContent")
            .await
            .expect("evaluation failed");
        assert_eq!(result.as_str().unwrap(), "Hello");

        // The automation flag must be masked before page scripts run
        let webdriver = ctx
            .evaluate("navigator.webdriver")
            .await
            .expect("evaluation failed");
        assert_eq!(webdriver, serde_json::json!(false));

        ctx.close().await.expect("close failed");
        renderer.shutdown().await.expect("shutdown failed");
    }
}
