//! Minimal automation-signal overrides needed to reach content.
//!
//! Some tag managers refuse to fire when they detect an automated browser.
//! The overrides here are limited to the presented user agent and the
//! `navigator.webdriver` flag; nothing else is masked.

/// Desktop Chrome user agent presented by the audit context.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Accept-Language presented alongside the user agent.
pub const ACCEPT_LANGUAGE: &str = "en-US";

/// Installed before every document so page scripts never observe
/// `navigator.webdriver === true`.
pub const WEBDRIVER_OVERRIDE: &str = r#"
Object.defineProperty(navigator, 'webdriver', {
  get: () => false
});
"#;
