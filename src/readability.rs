//! Generic fallback extractor for pages without a dedicated strategy.
//!
//! Site chrome (navigation, headers, footers, forms) is stripped first, then
//! the page goes through `readabilityrs` to pick the main content. When
//! readability finds nothing, the cleaned `<body>` is used as is.
//!
//! The output is lower fidelity than a dedicated strategy: images and embeds
//! are dropped instead of inlined.

use readabilityrs::Readability;
use tracing::{debug, info, instrument};

use crate::dom::{CleaningRule, Page, escape};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const CHROME: &[CleaningRule] = &[
    CleaningRule::remove("nav, header, footer, aside, form, button"),
    CleaningRule::remove("[role='navigation'], [role='banner'], [role='complementary'], [aria-hidden='true']"),
];

const MEDIA: &[CleaningRule] = &[CleaningRule::remove(
    "img, picture, video, audio, iframe, svg, canvas, object, embed",
)];

/// Fetch `request` and extract its main content heuristically.
#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let html = fetcher.page(request.as_str(), Profile::Desktop).await?;
    readable_document(request, &html).map(Some)
}

/// Main content of a page, before any headline or shell is added.
#[derive(Debug, Clone)]
pub struct Readable {
    /// Document `<title>`, else the title readability settled on.
    pub title: Option<String>,
    /// Main content with media removed.
    pub content: String,
}

/// Pick the main content of `html`. `url` resolves relative links.
pub fn readable_content(url: &str, html: &str) -> Result<Readable, ExtractError> {
    let mut page = Page::parse(html);
    let root = page.root();
    page.apply(root, CHROME)?;

    let readability = Readability::new(&page.outer_html(root), Some(url), None)
        .map_err(|e| ExtractError::Readability(e.to_string()))?;
    let article = readability.parse();

    let parsed = article
        .as_ref()
        .and_then(|a| a.content.as_deref())
        .map(without_media)
        .transpose()?
        .filter(|(_, text)| !text.is_empty());

    let content = match parsed {
        Some((content, _)) => content,
        None => {
            debug!("Readability found nothing; using whole body");
            let (content, text) = without_media(&page.inner_html(page.find("body")?))?;
            if text.is_empty() {
                return Err(ExtractError::NoContent { url: url.to_string() });
            }
            content
        }
    };

    let title = page
        .title()
        .or_else(|| article.and_then(|a| a.title))
        .filter(|t| !t.trim().is_empty());

    Ok(Readable { title, content })
}

/// Drop media from an HTML fragment. Returns the markup and its text.
fn without_media(html: &str) -> Result<(String, String), ExtractError> {
    let mut page = Page::parse(&format!("<html><body>{html}</body></html>"));
    let body = page.find("body")?;
    page.apply(body, MEDIA)?;
    Ok((page.inner_html(body), page.text(body)))
}

/// Build a printable document from already-fetched HTML.
pub fn readable_document(request: &ArticleRequest, html: &str) -> Result<PrintableArticle, ExtractError> {
    let readable = readable_content(request.as_str(), html)?;
    let title = readable.title.unwrap_or_else(|| request.as_str().to_string());

    let label = request.label(&title);
    let body = format!(
        "<h1><a href=\"{}\">{}</a></h1>{}",
        escape(request.as_str()),
        escape(&label),
        readable.content
    );
    info!(title = %label, bytes = body.len(), "Extracted readable content");
    Ok(PrintableArticle::assemble(request, label, &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    const PAGE: &str = r#"<html><head><title>Why rivers move</title></head><body>
        <nav><a href="/">Home</a><a href="/world">World</a><a href="/science">Science</a></nav>
        <div class="wrapper">
          <div class="sidebar related"><p>Read also: a very long list of unrelated headlines, and more.</p>
            <a href="/1">Link one with quite a long anchor text</a></div>
          <div class="story-body">
            <p>Rivers migrate across their floodplains over centuries, carving new channels as they go.</p>
            <p>Sediment builds on the inner bank, while the outer bank erodes, slowly shifting the meander.</p>
            <img src="https://cdn.example.com/river.jpg">
            <p>Engineers who straighten rivers often find, decades later, that the river has other plans.</p>
          </div>
        </div>
        <footer><p>Copyright, all rights reserved, and other boilerplate text here.</p></footer>
        </body></html>"#;

    #[test]
    fn test_extracts_main_content_without_chrome() {
        let req = ArticleRequest::parse("https://unknown.example.org/rivers", Some("7".into())).unwrap();
        let doc = readable_document(&req, PAGE).unwrap();
        assert_eq!(doc.title, "7_Why rivers move");
        assert!(doc.html.contains("<h1><a href=\"https://unknown.example.org/rivers\">7_Why rivers move</a></h1>"));
        assert!(doc.html.contains("Rivers migrate across their floodplains"));
        assert!(!doc.html.contains("Copyright"));
        assert!(!doc.html.contains("World"));
        assert!(!doc.html.contains("<img"));
    }

    #[test]
    fn test_falls_back_to_body_for_short_pages() {
        let req = ArticleRequest::parse("https://unknown.example.org/short", None).unwrap();
        let doc = readable_document(&req, "<html><head><title>Short</title></head><body><p>Just one line.</p></body></html>").unwrap();
        assert_eq!(doc.title, "Short");
        assert!(doc.html.contains("Just one line."));
    }

    #[test]
    fn test_empty_page_is_an_error() {
        let req = ArticleRequest::parse("https://unknown.example.org/empty", None).unwrap();
        let err = readable_document(&req, "<html><body><nav>menu</nav></body></html>").unwrap_err();
        assert!(matches!(err, ExtractError::NoContent { .. }));
    }

    #[tokio::test]
    async fn test_extract_fetches_once() {
        let url = "https://unknown.example.org/rivers";
        let fetcher = MockFetcher::new().with_page(url, PAGE);
        let req = ArticleRequest::parse(url, None).unwrap();
        let doc = extract(&fetcher, &req).await.unwrap().unwrap();
        assert_eq!(doc.title, "Why rivers move");
        assert_eq!(fetcher.page_calls_for(url), 1);
    }
}
