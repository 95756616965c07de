//! Taipei Times.
//!
//! The byline sits in a `div.name` outside the story block and is moved into a
//! list right after the headline. The site serves crawlers the full page.

use tracing::instrument;

use super::common::{finish, link_headline, title_or};
use crate::dom::{CleaningRule, Page, escape};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[
    CleaningRule::remove("div.imgboxa, div.boxTitle"),
    CleaningRule::remove("ul"),
];

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let html = fetcher.page(request.as_str(), Profile::Crawler).await?;
    let mut page = Page::parse(&html);
    let title = title_or(&page, request.as_str());

    let article = page.find("div.archives")?;
    let author = page.find("div.name").ok().map(|id| page.text(id));
    page.apply(article, RULES)?;

    let headline = page.find_in(article, "h1")?;
    link_headline(&mut page, headline, request);
    if let Some(author) = author.filter(|a| !a.is_empty()) {
        page.insert_after(headline, &format!("<ul><li>{}</li></ul>", escape(&author)));
    }

    finish(fetcher, request, &mut page, "", &[article], &request.url, title)
        .await
        .map(Some)
}
