//! The Hindu.
//!
//! Cartoon pages (`cartoonscape`) and the weekly quiz column are not
//! articles and are skipped. `/thread/` long reads use a different template
//! and are reported as unsupported, which hands them to the generic extractor. Images are dropped: the lead
//! image is a lazy-loaded carousel that never resolves to a usable source.

use tracing::{info, instrument};

use super::common::{finish, link_headline, title_or};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const SKIPPED_TITLE: &str = "Mathrubootham";

const RULES: &[CleaningRule] = &[
    CleaningRule::remove("img, picture"),
    CleaningRule::remove(".support-jlm, .articlebelowtextad, .media-body, .subarticlepay"),
    CleaningRule::remove(".dfp-ad, .img-full-width, .clear"),
    CleaningRule::remove("div.also-read, div.related-topics"),
];

/// URLs recognized as non-articles without fetching anything.
pub fn is_skipped_url(url: &str) -> bool {
    url.contains("cartoonscape")
}

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    if is_skipped_url(request.as_str()) {
        info!("Skipping cartoon page");
        return Ok(None);
    }
    if request.url.path().contains("/thread/") {
        return Err(ExtractError::Unsupported {
            url: request.as_str().to_string(),
        });
    }

    let html = fetcher.page(request.as_str(), Profile::Desktop).await?;
    let mut page = Page::parse(&html);
    let title = title_or(&page, request.as_str());
    if title.contains(SKIPPED_TITLE) {
        info!(%title, "Skipping quiz column");
        return Ok(None);
    }

    let article = page.find("div.article")?;
    let headline = page.find_in(article, "h1.title, h1.special-heading, h1.headline")?;
    page.apply(article, RULES)?;
    link_headline(&mut page, headline, request);

    finish(fetcher, request, &mut page, "", &[article], &request.url, title)
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[tokio::test]
    async fn test_cartoon_is_skipped_without_fetching() {
        let fetcher = MockFetcher::new();
        let req = ArticleRequest::parse(
            "https://www.thehindu.com/opinion/cartoon/cartoonscape-february-1-2021/article33712345.ece",
            Some("4".into()),
        )
        .unwrap();
        assert!(extract(&fetcher, &req).await.unwrap().is_none());
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_quiz_column_is_skipped_after_fetch() {
        let url = "https://www.thehindu.com/society/mathrubootham-quiz/article1.ece";
        let fetcher = MockFetcher::new().with_page(
            url,
            "<html><head><title>Mathrubootham 120 - The Hindu</title></head><body></body></html>",
        );
        let req = ArticleRequest::parse(url, None).unwrap();
        assert!(extract(&fetcher, &req).await.unwrap().is_none());
        assert_eq!(fetcher.page_calls(), 1);
    }

    #[tokio::test]
    async fn test_extracts_article_without_images() {
        let url = "https://www.thehindu.com/opinion/editorial/budget-2021/article1.ece";
        let html = r#"<html><head><title>Budget 2021 - The Hindu</title></head><body>
            <div class="article">
              <h1 class="title">Budget 2021 Explained</h1>
              <div class="img-full-width"><img src="https://th.thgim.com/lead.jpg"></div>
              <p>The Finance Minister presented the Budget.</p>
              <div class="dfp-ad">ad</div>
              <div class="subarticlepay">Subscribe</div>
            </div></body></html>"#;
        let fetcher = MockFetcher::new().with_page(url, html);
        let req = ArticleRequest::parse(url, Some("3".into())).unwrap();

        let doc = extract(&fetcher, &req).await.unwrap().unwrap();
        assert_eq!(doc.title, "Budget 2021 - The Hindu");
        assert!(doc.html.contains(&format!("<h1 class=\"title\"><a href=\"{url}\">3_Budget 2021 Explained</a></h1>")));
        assert!(doc.html.contains("The Finance Minister"));
        assert!(!doc.html.contains("lead.jpg"));
        assert!(!doc.html.contains("Subscribe"));
        assert_eq!(fetcher.asset_calls(), 0);
    }

    #[tokio::test]
    async fn test_thread_is_unsupported_without_fetching() {
        let req = ArticleRequest::parse("https://www.thehindu.com/thread/politics/long-read/article2.ece", None).unwrap();
        let fetcher = MockFetcher::new();

        let err = extract(&fetcher, &req).await.unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported { .. }));
        assert!(!err.is_transient());
        assert_eq!(fetcher.total_calls(), 0);
    }
}
