//! Scoped headless Chrome sessions.
//!
//! A [`BrowserSession`] owns one Chrome process and one tab. Dropping the
//! session closes the tab and then the browser, so every exit path of a
//! strategy (including `?` and panics unwinding through it) tears the process
//! down. `headless_chrome` is a blocking API; callers run sessions inside
//! `tokio::task::spawn_blocking`.

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::BrowserConfig;
use crate::error::ExtractError;

fn browser_err(context: &str, e: impl std::fmt::Display) -> ExtractError {
    ExtractError::Browser(format!("{context}: {e}"))
}

pub struct BrowserSession {
    // Field order matters: the tab is dropped before the browser.
    tab: Arc<Tab>,
    _browser: Browser,
}

impl BrowserSession {
    /// Launch a fresh browser process with a single tab.
    #[instrument(level = "debug", skip_all, fields(headless = config.headless))]
    pub fn launch(config: &BrowserConfig) -> Result<Self, ExtractError> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .path(config.chrome_path.clone())
            .args(vec![OsStr::new("--disable-gpu")])
            .idle_browser_timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| browser_err("invalid launch options", e))?;
        let browser = Browser::new(options).map_err(|e| browser_err("failed to launch chrome", e))?;
        let tab = browser
            .new_tab()
            .map_err(|e| browser_err("failed to open tab", e))?;
        info!("Browser session started");
        Ok(Self {
            tab,
            _browser: browser,
        })
    }

    /// Navigate to `url` and return the rendered page source.
    ///
    /// When `wait_for` is given, waits up to `wait` for a matching element.
    /// A timeout there is not an error: the page is captured as-is.
    #[instrument(level = "info", skip(self, wait))]
    pub fn snapshot(
        &self,
        url: &str,
        wait_for: Option<&str>,
        wait: Duration,
    ) -> Result<String, ExtractError> {
        self.tab
            .navigate_to(url)
            .map_err(|e| browser_err("navigation failed", e))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| browser_err("navigation did not finish", e))?;
        if let Some(selector) = wait_for {
            if let Err(e) = self.tab.wait_for_element_with_custom_timeout(selector, wait) {
                debug!(selector, error = %e, "Marker element did not appear; capturing anyway");
            }
        }
        let html = self
            .tab
            .get_content()
            .map_err(|e| browser_err("failed to read page source", e))?;
        debug!(bytes = html.len(), "Captured rendered page");
        Ok(html)
    }

    /// Load a local HTML file and print it to PDF.
    #[instrument(level = "info", skip(self, options))]
    pub fn print_file(&self, path: &Path, options: PrintToPdfOptions) -> Result<Vec<u8>, ExtractError> {
        let url = url::Url::from_file_path(path)
            .map_err(|_| ExtractError::Render(format!("not an absolute path: {}", path.display())))?;
        self.tab
            .navigate_to(url.as_str())
            .map_err(|e| browser_err("failed to open document", e))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| browser_err("document did not load", e))?;
        self.tab
            .print_to_pdf(Some(options))
            .map_err(|e| ExtractError::Render(e.to_string()))
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            debug!(error = %e, "Tab close failed; browser process is killed anyway");
        }
        debug!("Browser session closed");
    }
}
