//! Down To Earth.
//!
//! Read from the AMP edition when one is linked. A page that loads but links
//! no AMP edition is read through Outline.

use tracing::{info, instrument};

use super::common::{discover_amp, finish, headline_html};
use super::outline;
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[
    CleaningRule::remove("amp-img, header"),
    CleaningRule::remove(".captionStory, .add-comment, .flexible-item, .latest-article"),
    CleaningRule::remove(".read-post-comment-div, .donate-text"),
];

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let amp = discover_amp(fetcher, &request.url).await?;
    if amp.url.is_none() && amp.title.is_some() {
        info!("No AMP edition; reading through Outline");
        return outline::extract(fetcher, request).await;
    }
    let amp_url = amp.require()?;
    let title = amp.title.clone().unwrap_or_else(|| request.as_str().to_string());

    let html = fetcher.page(amp_url.as_str(), Profile::Desktop).await?;
    let mut page = Page::parse(&html);
    let article = page.find("div.news-detail")?;
    let headline = page.find("h1")?;
    let headline = headline_html(request.as_str(), &request.label(&page.text(headline)));
    page.apply(article, RULES)?;

    finish(fetcher, request, &mut page, &headline, &[article], amp_url, title)
        .await
        .map(Some)
}
