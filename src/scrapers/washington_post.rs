//! Washington Post.
//!
//! The AMP edition is found over HTTP, else through the browser. Without an
//! AMP edition the article goes through Outline. Story pages keep the body
//! text in `p.font--body`; live and graphics pages only have `div.main`.

use tracing::{info, instrument};

use super::common::{discover_amp, finish, headline_html};
use super::outline;
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};

const MAIN_RULES: &[CleaningRule] = &[
    CleaningRule::remove(".ent-ad-mob, .ent-ad-leaderboard, .interstitial-link"),
    CleaningRule::remove(".ent-raw-container, .ent-video, .ent-video-fullwidth"),
];

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let amp = discover_amp(fetcher, &request.url).await?;
    let Some(amp_url) = amp.url else {
        info!("No AMP edition; reading through Outline");
        return outline::extract(fetcher, request).await;
    };
    let title = amp.title.unwrap_or_else(|| request.as_str().to_string());

    let html = fetcher.page(amp_url.as_str(), Profile::Crawler).await?;
    let mut page = Page::parse(&html);
    let headline = headline_html(request.as_str(), &request.label(&title));

    let paragraphs = match page.find("div.article-body") {
        Ok(body) => page.select_in(body, "p.font--body")?,
        Err(_) => Vec::new(),
    };
    if !paragraphs.is_empty() {
        for &p in &paragraphs {
            page.strip_attr(p, "class");
        }
        return finish(fetcher, request, &mut page, &headline, &paragraphs, &amp_url, title)
            .await
            .map(Some);
    }

    let main = page.find("div.main")?;
    page.apply(main, MAIN_RULES)?;
    finish(fetcher, request, &mut page, &headline, &[main], &amp_url, title)
        .await
        .map(Some)
}
