//! Articles read through the Outline reader (`https://outline.com/{url}`).
//!
//! Used directly for Medium and as the last resort of publishers whose AMP
//! edition cannot be found. Outline renders client-side and ships the
//! cleaned article as HTML in the `content` attribute of a `<raw>` element.

use tracing::{debug, instrument, warn};

use super::common::{headline_html, title_or};
use crate::dom::Page;
use crate::error::ExtractError;
use crate::fetch::Fetch;
use crate::images::{data_uri, image_mime};
use crate::models::{ArticleRequest, PrintableArticle};

pub const READER: &str = "https://outline.com/";

/// Reader URL for `article_url`.
pub fn reader_url(article_url: &str) -> String {
    format!("{READER}{article_url}")
}

#[instrument(level = "info", skip_all, fields(url = %request.url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    request: &ArticleRequest,
) -> Result<Option<PrintableArticle>, ExtractError> {
    let html = fetcher.rendered(&reader_url(request.as_str()), Some(".yue")).await?;
    let page = Page::parse(&html);
    let title = title_or(&page, request.as_str());
    let raw = page.find("raw")?;
    let content = page.attr(raw, "content").ok_or_else(|| ExtractError::missing("raw[content]"))?;

    let article = Page::parse(&content);
    let body_id = article.find("body")?;
    let mut body = headline_html(request.as_str(), &request.label(&title));
    for child in article.children(body_id) {
        let is_figure = article.name(child) == Some("figure") || article.find_in(child, "figure").is_ok();
        if !is_figure {
            body.push_str(&article.outer_html(child));
            continue;
        }
        // Only the first image of a figure is kept; captions are dropped.
        let Some(src) = article
            .find_in(child, "img")
            .ok()
            .and_then(|img| article.attr(img, "src"))
            .and_then(|src| request.url.join(&src).ok())
        else {
            debug!("Figure without image");
            continue;
        };
        match fetcher.asset(src.as_str()).await {
            Ok(asset) => {
                let mime = image_mime(asset.content_type.as_deref(), &src);
                body.push_str(&format!("<p><img src=\"{}\"></p>", data_uri(&mime, &asset.bytes)));
            }
            Err(e) => warn!(url = %src, error = %e, "Figure image fetch failed; dropping it"),
        }
    }

    Ok(Some(PrintableArticle::assemble(request, title, &body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::escape;
    use crate::testing::MockFetcher;

    #[tokio::test]
    async fn test_unwraps_raw_content_and_inlines_figures() {
        let url = "https://medium.com/@writer/on-budgets-1a2b3c";
        let inner = r#"<p>Budgets are moral documents.</p>
            <figure><img src="https://miro.medium.com/1.png"><img src="https://miro.medium.com/2.png"><figcaption>cap</figcaption></figure>
            <div><figure><img src="https://miro.medium.com/missing.png"></figure></div>
            <p>Second thought.</p>"#;
        let html = format!(
            r#"<html><head><title>On budgets</title></head><body><div class="yue"><raw content="{}"></raw></div></body></html>"#,
            escape(inner)
        );
        let fetcher = MockFetcher::new()
            .with_rendered(&reader_url(url), &html)
            .with_asset("https://miro.medium.com/1.png", vec![1, 2], None);
        let req = ArticleRequest::parse(url, Some("5".into())).unwrap();

        let doc = extract(&fetcher, &req).await.unwrap().unwrap();
        assert_eq!(doc.title, "On budgets");
        assert!(doc.html.contains(&format!("<h1><a href=\"{url}\">5_On budgets</a></h1>")));
        assert!(doc.html.contains("<p>Budgets are moral documents.</p>"));
        assert!(doc.html.contains(&format!("<p><img src=\"{}\"></p>", data_uri("image/png", &[1, 2]))));
        assert!(doc.html.contains("<p>Second thought.</p>"));
        assert!(!doc.html.contains("miro.medium.com"));
        assert!(!doc.html.contains("cap"));
        assert_eq!(fetcher.asset_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_raw_is_structural() {
        let url = "https://medium.com/x";
        let fetcher = MockFetcher::new().with_rendered(&reader_url(url), "<html><body>loading</body></html>");
        let req = ArticleRequest::parse(url, None).unwrap();
        let err = extract(&fetcher, &req).await.unwrap_err();
        assert!(matches!(err, ExtractError::Missing { .. }));
    }
}
