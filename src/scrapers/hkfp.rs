//! Hong Kong Free Press. Only the paragraphs of the entry body are kept.

use tracing::instrument;

use super::common::{finish, headline_html, title_or};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[CleaningRule::remove("figure, aside, section")];

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let html = fetcher.page(request.as_str(), Profile::Desktop).await?;
    let mut page = Page::parse(&html);
    let title = title_or(&page, request.as_str());

    let headline = page.find("h1.entry-title")?;
    let headline = headline_html(request.as_str(), &request.label(&page.text(headline)));
    let article = page.find("div.entry-content")?;
    page.apply(article, RULES)?;
    let paragraphs = page.select_in(article, "p")?;

    finish(fetcher, request, &mut page, &headline, &paragraphs, &request.url, title)
        .await
        .map(Some)
}
