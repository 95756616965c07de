//! INSIGHTS daily current affairs summary.
//!
//! The requested URL only selects this strategy; the page actually extracted
//! is the latest daily summary. That is yesterday's, or Saturday's when run on
//! a Monday. Its address is looked up on the current-affairs listing page by
//! link text, and derived from the dated URL pattern when the listing has not
//! been updated yet. The headline still links the requested URL.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use tracing::{info, instrument, warn};
use url::Url;

use super::common::{headline_html, title_or};
use crate::dom::Page;
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::images::inline_images;
use crate::models::{ArticleRequest, PrintableArticle};

pub const LISTING: &str = "https://www.insightsonindia.com/insights-ias-upsc-current-affairs/";

/// Day whose summary is the latest one published on `today`.
pub fn summary_day(today: NaiveDate) -> NaiveDate {
    let back = if today.weekday() == Weekday::Mon { 2 } else { 1 };
    today - Days::new(back)
}

/// Dated URL of the summary for `day`.
pub fn daily_url(day: NaiveDate) -> String {
    format!(
        "https://www.insightsonindia.com/{}/insights-daily-current-affairs-pib-summary-{}-{}/",
        day.format("%Y/%m/%d"),
        day.day(),
        day.format("%B-%Y")
    )
}

/// Link texts the listing page may use for `day`; the day of month is written
/// both with and without a leading zero.
fn listing_labels(day: NaiveDate) -> [String; 2] {
    let prefix = "INSIGHTS DAILY CURRENT AFFAIRS + PIB SUMMARY-";
    [
        format!("{prefix} {}", day.format("%d %B %Y")).to_uppercase(),
        format!("{prefix} {} {}", day.day(), day.format("%B %Y")).to_uppercase(),
    ]
}

/// Find the summary link for `day` on the listing page.
pub fn find_listed(html: &str, day: NaiveDate) -> Option<String> {
    let page = Page::parse(html);
    let list = page.find("div.list_div").ok()?;
    let labels = listing_labels(day);
    page.select_in(list, "li").ok()?.into_iter().find_map(|li| {
        let text = page.text(li).to_uppercase();
        if !labels.contains(&text) {
            return None;
        }
        page.find_in(li, "a").ok().and_then(|a| page.attr(a, "href"))
    })
}

async fn resolve_summary_url<F: Fetch>(fetcher: &F, day: NaiveDate) -> String {
    match fetcher.page(LISTING, Profile::Desktop).await {
        Ok(html) => {
            if let Some(url) = find_listed(&html, day) {
                return url;
            }
            info!(%day, "Summary not on the listing yet; using dated URL");
        }
        Err(e) => warn!(error = %e, "Listing page unavailable; using dated URL"),
    }
    daily_url(day)
}

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    extract_for(fetcher, request, Local::now().date_naive()).await
}

/// Extract the summary that is current on `today`.
pub async fn extract_for<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
    today: NaiveDate,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let summary_url = resolve_summary_url(fetcher, summary_day(today)).await;
    let base = Url::parse(&summary_url).map_err(|source| ExtractError::InvalidUrl {
        url: summary_url.clone(),
        source,
    })?;

    let html = fetcher.page(&summary_url, Profile::Desktop).await?;
    let mut page = Page::parse(&html);
    let headline = page.find("h1.entry-title")?;
    let heading = page.text(headline);
    let label = request.label(&heading);
    let title = title_or(&page, &heading);

    let article = page.find("div.pf-content")?;
    if let Ok(intro) = page.find_in(article, "blockquote") {
        page.remove(intro);
    }
    let wide: Vec<_> = page.select_in(article, "img.alignnone")?;
    inline_images(fetcher, &mut page, article, &base).await?;
    for img in wide {
        if page.attr(img, "src").is_some_and(|s| s.starts_with("data:")) {
            page.set_attr(img, "class", "center");
            page.retain_attrs(img, &["class", "src"]);
        }
    }

    let body = format!("{}{}", headline_html(request.as_str(), &label), page.outer_html(article));
    info!(%title, bytes = body.len(), "Assembled daily summary");
    Ok(Some(PrintableArticle::assemble(request, title, &body)))
}
