//! Perspectives in Anthropology.
//!
//! The WordPress AMP plugin publishes an AMP edition for most posts. Posts
//! without one go through the Mercury proxy.

use tracing::{info, instrument};

use super::common::{discover_amp, finish, link_headline};
use super::mercury;
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[
    CleaningRule::remove("footer, div.sharedaddy"),
    CleaningRule::remove("nav[data-layout='grid']"),
    CleaningRule::remove("amp-img"),
];

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let amp = discover_amp(fetcher, &request.url).await?;
    let Some(amp_url) = amp.url else {
        info!("No AMP edition; reading through the Mercury proxy");
        return mercury::extract(fetcher, request).await;
    };
    let title = amp.title.unwrap_or_else(|| request.as_str().to_string());

    let html = fetcher.page(amp_url.as_str(), Profile::Desktop).await?;
    let mut page = Page::parse(&html);
    let article = page.find("article.amp-wp-article")?;
    page.apply(article, RULES)?;
    let headline = page.find_in(article, "h1.amp-wp-title")?;
    link_headline(&mut page, headline, request);

    finish(fetcher, request, &mut page, "", &[article], &amp_url, title)
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    const URL: &str = "https://perspectivesinanthropology.com/2021/02/01/budget/";

    #[tokio::test]
    async fn test_amp_article() {
        let amp_url = "https://perspectivesinanthropology.com/2021/02/01/budget/amp/";
        let original = format!(r#"<html><head><title>Budget - Perspectives</title><link rel="amphtml" href="{amp_url}"></head></html>"#);
        let amp = r#"<html><body><article class="amp-wp-article">
            <h1 class="amp-wp-title">Budget 2021 Explained</h1>
            <amp-img src="x"></amp-img>
            <p>Gift economies and state budgets.</p>
            <div class="sharedaddy">Share this</div>
            <nav data-layout="grid">Previous post</nav>
            <footer>Filed under</footer>
            </article></body></html>"#;
        let fetcher = MockFetcher::new().with_page(URL, &original).with_page(amp_url, amp);
        let req = ArticleRequest::parse(URL, Some("3".into())).unwrap();

        let doc = extract(&fetcher, &req).await.unwrap().unwrap();
        assert!(doc.html.contains(&format!("<a href=\"{URL}\">3_Budget 2021 Explained</a>")));
        for gone in ["Share this", "Previous post", "Filed under", "amp-img"] {
            assert!(!doc.html.contains(gone), "{gone} survived");
        }
    }

    #[tokio::test]
    async fn test_no_amp_uses_mercury() {
        let proxied = r#"<html><head><title>Budget</title></head><body><article>
            <h1 class="hg-title">Budget 2021 Explained</h1>
            <div class="hg-social-logo-block"></div><p>Via proxy.</p></article></body></html>"#;
        let fetcher = MockFetcher::new()
            .with_page(URL, "<html><head><title>Budget</title></head></html>")
            .with_page(&mercury::proxy_url(URL), proxied);
        let req = ArticleRequest::parse(URL, None).unwrap();

        let doc = extract(&fetcher, &req).await.unwrap().unwrap();
        assert!(doc.html.contains("Via proxy."));
    }
}
