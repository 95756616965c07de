//! Dawn, read from its AMP edition.

use tracing::instrument;

use super::common::{amp_over_http, finish, link_headline};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[CleaningRule::remove(".amp-ad-container")];

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let amp = amp_over_http(fetcher, &request.url).await?;
    let amp_url = amp.require()?;
    let title = amp.title.clone().unwrap_or_else(|| request.as_str().to_string());

    let html = fetcher.page(amp_url.as_str(), Profile::Desktop).await?;
    let mut page = Page::parse(&html);
    let header = page.find("h1.story__title")?;
    let content = page.find("div.story__content")?;
    page.apply(content, RULES)?;
    link_headline(&mut page, header, request);
    let mut parts = vec![header];
    parts.extend(page.find("div.story__meta").ok());
    parts.push(content);

    finish(fetcher, request, &mut page, "", &parts, amp_url, title)
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[tokio::test]
    async fn test_title_meta_and_content() {
        let url = "https://www.dawn.com/news/1605000/budget";
        let amp_url = "https://www.dawn.com/news/1605000/budget/amp";
        let original = format!(r#"<html><head><title>Editorial: Budget - DAWN.COM</title><link rel="amphtml" href="{amp_url}"></head></html>"#);
        let amp = r#"<html><body>
            <h1 class="story__title">Budget</h1>
            <div class="story__meta">Editorial, Published February 1, 2021</div>
            <div class="story__content"><p>The IMF programme constrains spending.</p><div class="amp-ad-container">ad</div></div>
            </body></html>"#;
        let fetcher = MockFetcher::new().with_page(url, &original).with_page(amp_url, amp);
        let req = ArticleRequest::parse(url, Some("3".into())).unwrap();

        let doc = extract(&fetcher, &req).await.unwrap().unwrap();
        assert_eq!(doc.title, "Editorial: Budget - DAWN.COM");
        assert!(doc.html.contains(&format!(
            "<body><h1 class=\"story__title\"><a href=\"{url}\">3_Budget</a></h1><div class=\"story__meta\">Editorial, Published February 1, 2021</div>\
             <div class=\"story__content\"><p>The IMF programme constrains spending.</p></div></body>"
        )));
        assert_eq!(fetcher.rendered_calls(), 0);
    }
}
