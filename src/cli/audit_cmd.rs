//! `tagprobe audit <url>` — run the extraction pipeline against a live page.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cli::output;
use crate::probe::{Probe, ProbeConfig};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;

/// Run the audit command.
pub async fn run(url: &str, timeout_ms: u64, settle_ms: u64) -> Result<()> {
    let renderer = ChromiumRenderer::new()
        .await
        .context("failed to launch browser")?;
    let mut ctx = renderer.new_context().await.context("failed to open page")?;

    let spinner = if output::is_quiet() || output::is_json() {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner} {msg}").expect("valid template"));
        pb.set_message(format!("auditing {url}"));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    let config = ProbeConfig {
        nav_timeout_ms: timeout_ms,
        settle_ms,
        ..ProbeConfig::default()
    };
    let probe = Probe::new(url, config);
    let report = probe.run(ctx.as_mut()).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    ctx.close().await?;
    renderer.shutdown().await?;

    let report = report?;
    if output::is_json() {
        output::print_json(&report);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}
