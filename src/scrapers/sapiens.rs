//! SAPIENS. The article body is injected by script, so the page is rendered
//! in the browser until `.entry-content` appears.

use tracing::instrument;

use super::common::{finish, link_headline, title_or};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::Fetch;
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[CleaningRule::remove("aside, figure, div.widget")];

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let html = fetcher.rendered(request.as_str(), Some(".entry-content")).await?;
    let mut page = Page::parse(&html);
    let title = title_or(&page, request.as_str());

    let root = page.root();
    page.apply(root, RULES)?;
    let headline = page.find("h1[itemprop='headline']")?;
    page.strip_attr(headline, "class");
    link_headline(&mut page, headline, request);
    let article = page.find("div.entry-content")?;

    finish(fetcher, request, &mut page, "", &[headline, article], &request.url, title)
        .await
        .map(Some)
}
