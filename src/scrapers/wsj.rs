//! Wall Street Journal.
//!
//! Articles are read from their AMP edition, which lives under `/amp/` right
//! after the host. The AMP edition serves the full text to a search-engine
//! crawler, so the crawler profile is used.

use tracing::instrument;

use super::common::{finish, link_headline, title_or};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const RULES: &[CleaningRule] = &[
    CleaningRule::remove("div.share-bar, div.media-object"),
    CleaningRule::remove("div.wsj-ad"),
    CleaningRule::remove("div[amp-access='NOT access']"),
];

/// `https://www.wsj.com/articles/x` becomes `https://www.wsj.com/amp/articles/x`.
pub fn amp_url(request: &ArticleRequest) -> String {
    let rest = &request.as_str()[request.url.origin().ascii_serialization().len()..];
    format!("{}amp{}", request.origin(), rest)
}

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let html = fetcher.page(&amp_url(request), Profile::Crawler).await?;
    let mut page = Page::parse(&html);
    let title = title_or(&page, request.as_str());

    let main = page.find("main#main")?;
    page.apply(main, RULES)?;
    let headline = page.find_in(main, "h1.wsj-article-headline")?;
    link_headline(&mut page, headline, request);

    finish(fetcher, request, &mut page, "", &[main], &request.url, title)
        .await
        .map(Some)
}
