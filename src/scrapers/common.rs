//! Helpers shared by the publisher strategies.
//!
//! - AMP discovery: find the `rel=amphtml` link of an article, over plain HTTP
//!   or through the browser when HTTP is refused
//! - Headline rewriting with the sequence index
//! - The final "inline images, wrap in the shell" step

use ego_tree::NodeId;
use tracing::{debug, info, instrument};
use url::Url;

use crate::dom::{Page, escape};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::images::inline_images;
use crate::models::{ArticleRequest, PrintableArticle};

/// Result of looking for an article's AMP variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmpLink {
    /// Absolute URL of the AMP page, if the article links one.
    pub url: Option<Url>,
    /// Title of the original page, if it could be loaded at all.
    pub title: Option<String>,
}

impl AmpLink {
    /// Neither the page nor a title was found.
    pub fn is_unreachable(&self) -> bool {
        self.url.is_none() && self.title.is_none()
    }

    /// The AMP URL, or [`ExtractError::Missing`] when there is none.
    pub fn require(&self) -> Result<&Url, ExtractError> {
        self.url.as_ref().ok_or_else(|| ExtractError::missing("link[rel=amphtml]"))
    }
}

/// Read the AMP link and the title out of an article page.
pub fn amp_from_html(html: &str, base: &Url) -> AmpLink {
    let page = Page::parse(html);
    let url = page
        .find("link[rel='amphtml']")
        .ok()
        .and_then(|id| page.attr(id, "href"))
        .and_then(|href| base.join(href.trim()).ok());
    AmpLink {
        url,
        title: page.title(),
    }
}

/// Look for the AMP link over plain HTTP.
///
/// A 404 is not an error here: it yields an empty [`AmpLink`] so the caller
/// can try the browser instead.
#[instrument(level = "info", skip_all, fields(url = %url))]
pub async fn amp_over_http<F: Fetch>(fetcher: &F, url: &Url) -> Result<AmpLink, ExtractError> {
    match fetcher.page(url.as_str(), Profile::Desktop).await {
        Ok(html) => Ok(amp_from_html(&html, url)),
        Err(e) if e.status() == Some(404) => {
            debug!("Article page refused plain HTTP");
            Ok(AmpLink::default())
        }
        Err(e) => Err(e),
    }
}

/// Look for the AMP link in the browser-rendered page.
#[instrument(level = "info", skip_all, fields(url = %url))]
pub async fn amp_over_browser<F: Fetch>(fetcher: &F, url: &Url) -> Result<AmpLink, ExtractError> {
    let html = fetcher.rendered(url.as_str(), None).await?;
    Ok(amp_from_html(&html, url))
}

/// HTTP first, then the browser when HTTP returned nothing at all.
pub async fn discover_amp<F: Fetch>(fetcher: &F, url: &Url) -> Result<AmpLink, ExtractError> {
    let link = amp_over_http(fetcher, url).await?;
    if !link.is_unreachable() {
        return Ok(link);
    }
    let link = amp_over_browser(fetcher, url).await?;
    info!(found = link.url.is_some(), "AMP discovery fell back to the browser");
    Ok(link)
}

/// Rewrite the headline `id` into a link to the article labelled with the
/// sequence index. Returns the headline text without the index.
pub fn link_headline(page: &mut Page, id: NodeId, request: &ArticleRequest) -> String {
    let text = page.text(id);
    page.rewrite_headline(id, request.as_str(), &request.label(&text));
    text
}

/// A fresh `<h1>` linking to the article, labelled `label`.
pub fn headline_html(href: &str, label: &str) -> String {
    format!("<h1><a href=\"{}\">{}</a></h1>", escape(href), escape(label))
}

/// Inline the images below each of `parts`, serialize them in order and wrap
/// the result in the document shell.
pub async fn finish<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
    page: &mut Page,
    prefix: &str,
    parts: &[NodeId],
    base: &Url,
    title: String,
) -> Result<PrintableArticle, ExtractError> {
    let mut body = prefix.to_string();
    for &part in parts {
        inline_images(fetcher, page, part, base).await?;
        body.push_str(&page.outer_html(part));
    }
    info!(title = %title, bytes = body.len(), "Assembled article");
    Ok(PrintableArticle::assemble(request, title, &body))
}

/// Document title, else `fallback`.
pub fn title_or(page: &Page, fallback: &str) -> String {
    page.title().unwrap_or_else(|| fallback.to_string())
}
