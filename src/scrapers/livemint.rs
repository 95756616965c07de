//! Livemint, read from its AMP edition.
//!
//! Every Livemint story links an AMP edition, so a page without one is
//! treated as a structural mismatch.

use tracing::instrument;

use super::common::{discover_amp, finish, link_headline};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[
    CleaningRule::remove("div.bcrumb, div.promotion, div.share-icons-box, div.epaperPromo"),
    CleaningRule::remove("section[amp-access='NOT subscribed AND decision']"),
    CleaningRule::remove("figure, aside, amp-ad"),
];

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
    let article = page.find("div.mainSec")?;
    page.apply(article, RULES)?;
    let headline = page.find_in(article, "h1")?;
    link_headline(&mut page, headline, request);

    finish(fetcher, request, &mut page, "", &[article], amp_url, title)
        .await
        .map(Some)
}
