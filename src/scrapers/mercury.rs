//! The Guardian, New York Times and Global Times, read through the Mercury
//! AMP proxy.
//!
//! The proxy turns any article into a simple AMP page with a predictable
//! layout (`article` > `h1.hg-title`). It answers a desktop client with a
//! redirect loop, so requests use the mobile profile. When the proxy returns
//! 404 to plain HTTP the same proxy URL is loaded in the browser.

use tracing::{instrument, warn};

use super::common::{finish, link_headline, title_or};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

pub const PROXY: &str = "https://mercury.postlight.com/amp?url=";

const RULES: &[CleaningRule] = &[
    CleaningRule::remove("figure, aside, amp-img"),
    CleaningRule::remove("div.hg-social-logo-block"),
];

/// Proxy URL for `article_url`.
pub fn proxy_url(article_url: &str) -> String {
    format!("{PROXY}{article_url}")
}

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let url = proxy_url(request.as_str());
    let html = match fetcher.page(&url, Profile::Mobile).await {
        Ok(html) => html,
        Err(e) if e.status() == Some(404) => {
            warn!(%url, "Proxy refused plain HTTP; loading it in the browser");
            fetcher.rendered(&url, None).await?
        }
        Err(e) => return Err(e),
    };

    let mut page = Page::parse(&html);
    let title = title_or(&page, request.as_str());
    let article = page.find("article")?;
    page.apply(article, RULES)?;
    let headline = page.find_in(article, "h1.hg-title")?;
    link_headline(&mut page, headline, request);

    finish(fetcher, request, &mut page, "", &[article], &request.url, title)
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    const ARTICLE: &str = "https://www.theguardian.com/commentisfree/2021/feb/01/budget";

    const PROXIED: &str = r#"<html><head><title>Budget 2021 | The Guardian</title></head><body>
        <article class="hg-article-container">
          <h1 class="hg-title">Budget 2021 Explained</h1>
          <div class="hg-social-logo-block"><a href="https://twitter.com">tw</a></div>
          <figure><amp-img src="https://i.guim.co.uk/lead.jpg"></amp-img></figure>
          <p>The chancellor, facing a deficit, chose to spend.</p>
          <p><img src="https://i.guim.co.uk/chart.png"></p>
          <aside>More on this story</aside>
        </article></body></html>"#;

    #[tokio::test]
    async fn test_extracts_through_proxy() {
        let fetcher = MockFetcher::new()
            .with_page(&proxy_url(ARTICLE), PROXIED)
            .with_asset("https://i.guim.co.uk/chart.png", vec![9, 9], Some("image/png"));
        let req = ArticleRequest::parse(ARTICLE, Some("3".into())).unwrap();

        let doc = extract(&fetcher, &req).await.unwrap().unwrap();
        assert_eq!(doc.title, "Budget 2021 | The Guardian");
        assert!(doc.html.contains(&format!("<a href=\"{ARTICLE}\">3_Budget 2021 Explained</a>")));
        assert!(doc.html.contains("data:image/png;base64,"));
        assert!(!doc.html.contains("lead.jpg"));
        assert!(!doc.html.contains("More on this story"));
        assert_eq!(fetcher.page_calls(), 1);
        assert_eq!(fetcher.asset_calls(), 1);
    }

    #[tokio::test]
    async fn test_proxy_404_uses_browser() {
        let url = proxy_url(ARTICLE);
        let fetcher = MockFetcher::new().with_status(&url, 404).with_rendered(&url, PROXIED);
        let req = ArticleRequest::parse(ARTICLE, None).unwrap();

        let doc = extract(&fetcher, &req).await.unwrap().unwrap();
        assert!(doc.html.contains(">Budget 2021 Explained</a>"));
        assert_eq!(fetcher.rendered_calls(), 1);
    }
}
