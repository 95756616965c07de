//! "This day in history" pages from thepeoplehistory.com and indianage.com.
//!
//! Both are daily reference pages without a headline of their own, so one is
//! prepended: an indexed link back to the page. Any other page on either site
//! is reported as unsupported and left to the generic extractor.

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;

use super::common::{headline_html, title_or};
use crate::dom::{CleaningRule, Page};
use crate::error::ExtractError;
use crate::fetch::{Fetch, Profile};
use crate::models::{ArticleRequest, PrintableArticle};
use crate::readability;

pub const PEOPLE_HISTORY: &str = "http://www.thepeoplehistory.com/this-day-in-history.html";
pub const INDIAN_AGE: &str = "https://www.indianage.com/indian_history";

const RULES: &[CleaningRule] = &[CleaningRule::remove("img, small")];

static TAKEN_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Taken From Our This Day In History From\s*<br\s*/?>\s*to\s*<br\s*/?>").expect("static regex")
});

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    match request.as_str() {
        PEOPLE_HISTORY => people_history(fetcher, request).await.map(Some),
        INDIAN_AGE => indian_age(fetcher, request).await.map(Some),
        _ => Err(ExtractError::Unsupported {
            url: request.as_str().to_string(),
        }),
    }
}

async fn people_history<F: Fetch>(fetcher: &F, request: &ArticleRequest) -> Result<PrintableArticle, ExtractError> {
    let html = fetcher.page(request.as_str(), Profile::Desktop).await?;
    let mut page = Page::parse(&html);
    let title = title_or(&page, request.as_str());

    let content = page.find("div#left-content")?;
    page.apply(content, RULES)?;
    for id in page.select_in(content, "h2, a")? {
        if page.text(id).contains("This Week In History") {
            page.remove(id);
        }
    }

    let outer = page.outer_html(content);
    let cleaned = TAKEN_FROM.replace_all(&outer, "");
    let body = format!("{}{}", headline_html(request.as_str(), &request.label(&title)), cleaned);
    Ok(PrintableArticle::assemble(request, title, &body))
}

async fn indian_age<F: Fetch>(fetcher: &F, request: &ArticleRequest) -> Result<PrintableArticle, ExtractError> {
    let html = fetcher.page(request.as_str(), Profile::Crawler).await?;
    let readable = readability::readable_content(request.as_str(), &html)?;
    let title = format!(
        "Today in Indian History - Events for {}",
        Local::now().date_naive().format("%B %d")
    );
    let body = format!("{}{}", headline_html(request.as_str(), &request.label(&title)), readable.content);
    Ok(PrintableArticle::assemble(request, title, &body))
}
