//! Economic and Political Weekly.
//!
//! Links shared from the weekly index are sometimes percent-encoded twice and
//! answer 404; the decoded URL is tried once before giving up. The article is
//! the second `div.content` of the main block. Images use site-relative
//! sources.

use tracing::{instrument, warn};
use url::Url;

use super::common::{finish, headline_html, title_or};
use crate::dom::Page;
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

async fn fetch_with_decoded_retry<F: Fetch>(fetcher: &F, url: &str) -> Result<(String, String), ExtractError> {
    match fetcher.page(url, Profile::Desktop).await {
        Ok(html) => Ok((url.to_string(), html)),
        Err(e) if e.status() == Some(404) => {
            let decoded = urlencoding::decode(url).map(|d| d.into_owned()).unwrap_or_else(|_| url.to_string());
            if decoded == url {
                return Err(e);
            }
            warn!(%decoded, "Article not found; retrying the decoded URL");
            let html = fetcher.page(&decoded, Profile::Desktop).await?;
            Ok((decoded, html))
        }
        Err(e) => Err(e),
    }
}

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let (resolved, html) = fetch_with_decoded_retry(fetcher, request.as_str()).await?;
    let base = Url::parse(&resolved).unwrap_or_else(|_| request.url.clone());
    let mut page = Page::parse(&html);
    let title = title_or(&page, request.as_str());

    let headline = page.find("h1#page-title")?;
    let headline = headline_html(&resolved, &request.label(&page.text(headline)));
    let main = page.find("#block-system-main")?;
    let article = page
        .select_in(main, "div.content")?
        .get(1)
        .copied()
        .ok_or_else(|| ExtractError::missing("#block-system-main div.content:nth(2)"))?;

    finish(fetcher, request, &mut page, &headline, &[article], &base, title)
        .await
        .map(Some)
}
