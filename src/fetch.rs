//! Network access for strategies.
//!
//! Strategies never talk to `reqwest` or Chrome directly; they go through the
//! [`Fetch`] trait so the router and every strategy can be exercised against
//! in-memory fixtures.
//!
//! # Request profiles
//!
//! | Profile | User agent | Extra headers |
//! |---------|------------|---------------|
//! | [`Profile::Desktop`] | random desktop browser | none |
//! | [`Profile::Crawler`] | search-engine crawler | `Referer`, `X-Forwarded-For` |
//! | [`Profile::Mobile`] | Android Chrome | none |

use rand::seq::IndexedRandom;
use rand::rng;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::browser::BrowserSession;
use crate::config::{BrowserConfig, Config};
use crate::error::ExtractError;

const DESKTOP_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

const CRAWLER_AGENT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
const CRAWLER_REFERER: &str = "https://www.facebook.com/";
const CRAWLER_FORWARDED_FOR: &str = "66.249.66.1";

const MOBILE_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; SM-M315F) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/81.0.4044.117 Mobile Safari/537.36";

/// How a page request presents itself to the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Desktop,
    Crawler,
    Mobile,
}

impl Profile {
    fn headers(self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let agent = match self {
            Profile::Desktop => DESKTOP_AGENTS.choose(&mut rng()).copied().unwrap_or(DESKTOP_AGENTS[0]),
            Profile::Crawler => CRAWLER_AGENT,
            Profile::Mobile => MOBILE_AGENT,
        };
        headers.insert(USER_AGENT, HeaderValue::from_static(agent));
        if self == Profile::Crawler {
            headers.insert(REFERER, HeaderValue::from_static(CRAWLER_REFERER));
            headers.insert("x-forwarded-for", HeaderValue::from_static(CRAWLER_FORWARDED_FOR));
        }
        headers
    }
}

/// Raw bytes of a fetched resource such as an image.
#[derive(Debug, Clone)]
pub struct Asset {
    pub bytes: Vec<u8>,
    /// Value of the `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
}

/// Everything a strategy may ask of the network.
pub trait Fetch {
    /// GET `url` and return the body as text. Non-2xx is an error.
    async fn page(&self, url: &str, profile: Profile) -> Result<String, ExtractError>;

    /// GET `url` and return the raw body.
    async fn asset(&self, url: &str) -> Result<Asset, ExtractError>;

    /// Load `url` in a scripted browser and return the rendered source,
    /// optionally waiting for `wait_for` to appear first.
    async fn rendered(&self, url: &str, wait_for: Option<&str>) -> Result<String, ExtractError>;
}

/// Production [`Fetch`] implementation: `reqwest` for plain requests and a
/// short-lived headless Chrome session per rendered page.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    browser: BrowserConfig,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| ExtractError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self {
            client,
            browser: config.browser.clone(),
        })
    }

    async fn get(&self, url: &str, headers: HeaderMap) -> Result<reqwest::Response, ExtractError> {
        let http_err = |source| ExtractError::Http {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).headers(headers).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success response");
            return Err(ExtractError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn page(&self, url: &str, profile: Profile) -> Result<String, ExtractError> {
        let response = self.get(url, profile.headers()).await?;
        let body = response.text().await.map_err(|source| ExtractError::Http {
            url: url.to_string(),
            source,
        })?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }

    #[instrument(level = "debug", skip(self))]
    async fn asset(&self, url: &str) -> Result<Asset, ExtractError> {
        let response = self.get(url, Profile::Desktop.headers()).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|source| ExtractError::Http {
            url: url.to_string(),
            source,
        })?;
        debug!(bytes = bytes.len(), ?content_type, "Fetched asset");
        Ok(Asset {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    #[instrument(level = "info", skip(self))]
    async fn rendered(&self, url: &str, wait_for: Option<&str>) -> Result<String, ExtractError> {
        let config = self.browser.clone();
        let url = url.to_string();
        let wait_for = wait_for.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let session = BrowserSession::launch(&config)?;
            session.snapshot(&url, wait_for.as_deref(), Duration::from_secs(config.wait_secs))
        })
        .await
        .map_err(|e| ExtractError::Browser(format!("browser task did not complete: {e}")))?
    }
}
