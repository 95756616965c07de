//! The Economist, read from its AMP edition.
//!
//! The document is the article header (headline rewritten) followed by the
//! article body.

use tracing::instrument;

use super::common::{discover_amp, finish, link_headline};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[CleaningRule::remove("figure, div.advert, iframe")];

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let amp = discover_amp(fetcher, &request.url).await?;
    let amp_url = amp.require()?;
    let title = amp.title.clone().unwrap_or_else(|| request.as_str().to_string());

    let html = fetcher.page(amp_url.as_str(), Profile::Desktop).await?;
    let mut page = Page::parse(&html);
    let root = page.root();
    page.remove_all(root, "div.layout-article-links")?;

    let header = page.find("header.article__header")?;
    let headline = page.find_in(header, "span.article__headline")?;
    link_headline(&mut page, headline, request);
    let body = page.find("div.layout-article-body")?;
    page.apply(body, RULES)?;

    finish(fetcher, request, &mut page, "", &[header, body], amp_url, title)
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[tokio::test]
    async fn test_header_and_body_in_order() {
        let url = "https://www.economist.com/finance-and-economics/2021/02/01/budget";
        let amp_url = "https://www.economist.com/finance-and-economics/2021/02/01/budget/amp";
        let original = format!(r#"<html><head><title>Budget | The Economist</title><link rel="amphtml" href="{amp_url}"></head></html>"#);
        let amp = r#"<html><body>
            <header class="article__header"><h1><span class="article__subheadline">Finance</span><span class="article__headline">Budget 2021 Explained</span></h1></header>
            <div class="layout-article-body">
              <p>India's government bets on growth.</p>
              <figure><amp-img src="x"></amp-img></figure>
              <div class="advert">ad</div>
              <iframe src="https://video"></iframe>
            </div>
            <div class="layout-article-links">More from Finance</div>
            </body></html>"#;
        let fetcher = MockFetcher::new().with_page(url, &original).with_page(amp_url, amp);
        let req = ArticleRequest::parse(url, Some("3".into())).unwrap();

        let doc = extract(&fetcher, &req).await.unwrap().unwrap();
        assert_eq!(doc.title, "Budget | The Economist");
        let header_at = doc.html.find(&format!("<a href=\"{url}\">3_Budget 2021 Explained</a>")).unwrap();
        let body_at = doc.html.find("bets on growth").unwrap();
        assert!(header_at < body_at);
        for gone in ["advert", "iframe", "More from Finance"] {
            assert!(!doc.html.contains(gone), "{gone} survived");
        }
    }
}
