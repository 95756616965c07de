//! Core data types passed between the router, strategies and outputs.
//!
//! - [`ArticleRequest`]: one URL to extract plus its optional sequence index
//! - [`PrintableArticle`]: the self-contained HTML document a strategy produces
//!
//! A strategy returns `Option<PrintableArticle>`; `None` means the URL was
//! recognized as something that is not an article and should be skipped.

use serde::Serialize;
use url::Url;

use crate::dom::escape;
use crate::error::ExtractError;

/// Stylesheet embedded in the `<head>` of every produced document.
pub const PRINT_CSS: &str = include_str!("../assets/print.css");

/// One article to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRequest {
    /// The full article URL as supplied by the caller.
    pub url: Url,
    /// Caller-supplied label, e.g. the position in a batch. Opaque.
    pub index: Option<String>,
}

impl ArticleRequest {
    /// Parse `url` into a request.
    ///
    /// An empty or whitespace-only index is treated as no index.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidUrl`] if `url` is not an absolute URL.
    pub fn parse(url: &str, index: Option<String>) -> Result<Self, ExtractError> {
        let parsed = Url::parse(url.trim()).map_err(|source| ExtractError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let index = index
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty());
        Ok(Self { url: parsed, index })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Dispatch key of this request, see [`origin_of`].
    pub fn origin(&self) -> String {
        origin_of(&self.url)
    }

    /// Prefix `text` with the sequence index: `"{index}_{text}"`.
    ///
    /// Without an index the text is returned unchanged.
    pub fn label(&self, text: &str) -> String {
        match &self.index {
            Some(index) => format!("{index}_{text}"),
            None => text.to_string(),
        }
    }
}

/// Normalized origin of a URL: `scheme://host/`, with `:port` only when the
/// port is not the scheme's default.
///
/// # Examples
///
/// ```ignore
/// let url = Url::parse("https://www.wsj.com/articles/x?mod=1").unwrap();
/// assert_eq!(origin_of(&url), "https://www.wsj.com/");
/// ```
pub fn origin_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}/", url.scheme(), host, port),
        None => format!("{}://{}/", url.scheme(), host),
    }
}

/// A self-contained, print-ready article.
#[derive(Debug, Clone, Serialize)]
pub struct PrintableArticle {
    /// The URL the article was requested with.
    pub source: String,
    /// Display title, possibly prefixed with the sequence index.
    pub title: String,
    /// Complete HTML document.
    pub html: String,
}

impl PrintableArticle {
    /// Wrap a cleaned fragment in the standard document shell: UTF-8 charset,
    /// `<title>`, the embedded print stylesheet and the fragment as body.
    pub fn assemble(request: &ArticleRequest, title: String, body: &str) -> Self {
        let html = format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
             <style>{}</style></head><body>{}</body></html>",
            escape(&title),
            PRINT_CSS,
            body
        );
        Self {
            source: request.as_str().to_string(),
            title,
            html,
        }
    }
}
