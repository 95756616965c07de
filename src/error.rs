//! Error type shared by fetching, extraction and rendering.
//!
//! Errors fall into two groups that the router and the retry policy treat
//! differently:
//!
//! - **Transient**: network failures, non-2xx responses and browser session
//!   failures. These are retried with backoff.
//! - **Structural**: the page was fetched but does not look like the markup a
//!   strategy expects. These are not retried; the router falls back to the
//!   generic extractor instead.

use thiserror::Error;

/// Everything that can go wrong while turning a URL into a printable article.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("browser session failed: {0}")]
    Browser(String),

    /// A selector the strategy depends on matched nothing.
    #[error("expected element `{selector}` not found")]
    Missing { selector: String },

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("no readable content found in {url}")]
    NoContent { url: String },

    /// The publisher is known but this page uses a template its strategy
    /// does not cover.
    #[error("{url} uses a layout this strategy does not handle")]
    Unsupported { url: String },

    #[error("readability failed: {0}")]
    Readability(String),

    #[error("pdf rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Shorthand for [`ExtractError::Missing`].
    pub fn missing(selector: &str) -> Self {
        ExtractError::Missing {
            selector: selector.to_string(),
        }
    }

    /// Whether retrying the same operation could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ExtractError::Http { .. } | ExtractError::Status { .. } | ExtractError::Browser(_)
        )
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ExtractError::Status { status, .. } => Some(*status),
            ExtractError::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_transient() {
        let e = ExtractError::Status {
            url: "https://example.com/".into(),
            status: 503,
        };
        assert!(e.is_transient());
        assert_eq!(e.status(), Some(503));
    }

    #[test]
    fn test_structural_errors_are_not_transient() {
        assert!(!ExtractError::missing("h1.headline").is_transient());
        assert!(
            !ExtractError::NoContent {
                url: "https://example.com/".into()
            }
            .is_transient()
        );
        assert_eq!(ExtractError::missing("div").status(), None);
        assert!(
            !ExtractError::Unsupported {
                url: "https://www.thehindu.com/thread/x".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn test_missing_message_names_selector() {
        let e = ExtractError::missing("div.story__content");
        assert_eq!(e.to_string(), "expected element `div.story__content` not found");
    }
}
