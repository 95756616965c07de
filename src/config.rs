//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so a missing file, an empty file, or a file
//! that only sets a couple of keys are all valid. Example:
//!
//! ```yaml
//! fetch_timeout_secs: 20
//! retry:
//!   attempts: 3
//!   initial_delay_secs: 4
//! browser:
//!   headless: true
//!   chrome_path: /usr/bin/chromium
//! pdf:
//!   footer_label: "Morning reading"
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Timeout applied to every single HTTP request.
    pub fetch_timeout_secs: u64,
    pub retry: RetryConfig,
    pub browser: BrowserConfig,
    pub pdf: PdfConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 30,
            retry: RetryConfig::default(),
            browser: BrowserConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Backoff applied around every dedicated strategy call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub attempts: usize,
    pub initial_delay_secs: u64,
    pub max_delay_secs: u64,
    /// Upper bound of the random jitter added to each delay.
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay_secs: 4,
            max_delay_secs: 60,
            jitter_ms: 0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.attempts,
            Duration::from_secs(self.initial_delay_secs),
            Duration::from_secs(self.max_delay_secs),
        )
        .with_jitter(Duration::from_millis(self.jitter_ms))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    /// How long to wait for a strategy's marker element after navigation.
    pub wait_secs: u64,
    /// Chrome/Chromium binary; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            wait_secs: 10,
            chrome_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Text printed at the left of every page footer.
    pub footer_label: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            footer_label: format!("Compiled by {}", env!("CARGO_PKG_NAME")),
        }
    }
}

/// Load configuration from `path`, or return defaults when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML for
/// [`Config`].
#[instrument(level = "info")]
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn Error>> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(Config::default());
    };
    let raw = std::fs::read_to_string(path)?;
    let config = parse_config(&raw)?;
    info!(path, "Loaded configuration");
    Ok(config)
}

fn parse_config(raw: &str) -> Result<Config, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(raw)
}
