//! Indian Express.

use tracing::instrument;

use super::common::{finish, headline_html, title_or};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[
    CleaningRule::remove("div.share-social"),
    CleaningRule::remove("img.size-full, img.size-medium"),
    CleaningRule::remove(".appstext, .storytags, .more-from, .abbott-disc, .embed-youtube"),
    CleaningRule::remove(".custom-caption, .inhouseimg, .ie-int-campign-ad, .pdsc-related-modify"),
    CleaningRule::remove("#id_newsletter_subscription, #story_content_parts, [id^='div-gpt-ad']"),
];

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let html = fetcher.page(request.as_str(), Profile::Desktop).await?;
    let mut page = Page::parse(&html);
    let title = title_or(&page, request.as_str());

    let headline = page.find("h1.native_story_title")?;
    let headline = headline_html(request.as_str(), &request.label(&page.text(headline)));
    let article = page.find("div.full-details")?;
    page.apply(article, RULES)?;

    finish(fetcher, request, &mut page, &headline, &[article], &request.url, title)
        .await
        .map(Some)
}
