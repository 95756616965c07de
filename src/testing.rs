//! In-memory [`Fetch`] implementation for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ExtractError;
use crate::fetch::{Asset, Fetch, Profile};

#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    rendered: HashMap<String, String>,
    assets: HashMap<String, Asset>,
    statuses: HashMap<String, u16>,
    /// Remaining transient failures per URL before the page is served.
    flaky: Mutex<HashMap<String, usize>>,
    page_log: Mutex<Vec<String>>,
    rendered_log: Mutex<Vec<String>>,
    asset_log: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_rendered(mut self, url: &str, html: &str) -> Self {
        self.rendered.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_asset(mut self, url: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        self.assets.insert(
            url.to_string(),
            Asset {
                bytes,
                content_type: content_type.map(str::to_string),
            },
        );
        self
    }

    /// Answer `url` with an HTTP error status.
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    /// Fail the first `times` page requests for `url` with a 503.
    pub fn failing_first(self, url: &str, times: usize) -> Self {
        self.flaky
            .lock()
            .unwrap()
            .insert(url.to_string(), times);
        self
    }

    pub fn page_calls_for(&self, url: &str) -> usize {
        self.page_log.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn page_calls(&self) -> usize {
        self.page_log.lock().unwrap().len()
    }

    pub fn rendered_calls(&self) -> usize {
        self.rendered_log.lock().unwrap().len()
    }

    pub fn asset_calls(&self) -> usize {
        self.asset_log.lock().unwrap().len()
    }

    /// Total network operations of any kind.
    pub fn total_calls(&self) -> usize {
        self.page_calls() + self.rendered_calls() + self.asset_calls()
    }
}

fn not_found(url: &str) -> ExtractError {
    ExtractError::Status {
        url: url.to_string(),
        status: 404,
    }
}

impl Fetch for MockFetcher {
    async fn page(&self, url: &str, _profile: Profile) -> Result<String, ExtractError> {
        self.page_log.lock().unwrap().push(url.to_string());
        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(remaining) = flaky.get_mut(url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ExtractError::Status {
                        url: url.to_string(),
                        status: 503,
                    });
                }
            }
        }
        if let Some(status) = self.statuses.get(url) {
            return Err(ExtractError::Status {
                url: url.to_string(),
                status: *status,
            });
        }
        self.pages.get(url).cloned().ok_or_else(|| not_found(url))
    }

    async fn asset(&self, url: &str) -> Result<Asset, ExtractError> {
        self.asset_log.lock().unwrap().push(url.to_string());
        self.assets.get(url).cloned().ok_or_else(|| not_found(url))
    }

    async fn rendered(&self, url: &str, _wait_for: Option<&str>) -> Result<String, ExtractError> {
        self.rendered_log.lock().unwrap().push(url.to_string());
        self.rendered
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractError::Browser(format!("no rendered fixture for {url}")))
    }
}
