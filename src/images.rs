//! Inline images as base64 data URIs so documents render without network
//! access.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ego_tree::NodeId;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::dom::Page;
use crate::error::ExtractError;
use crate::fetch::Fetch;

/// Attributes that may carry the real image URL, in order of preference.
/// Lazy-loading attributes win over `src`, which is often a placeholder.
const SOURCE_ATTRS: &[&str] = &["data-lazy-src", "data-src", "src"];

/// Attributes dropped from every inlined image so no external URL survives.
const EXTERNAL_ATTRS: &[&str] = &[
    "srcset",
    "data-srcset",
    "data-src",
    "data-lazy-src",
    "data-lazy-srcset",
    "sizes",
    "loading",
];

/// Encode `bytes` as a `data:` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Pick the MIME type for an image: the server's `Content-Type` when it names
/// an image, else a guess from the URL path, else JPEG.
pub fn image_mime(content_type: Option<&str>, url: &Url) -> String {
    if let Some(ct) = content_type {
        let essence = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if essence.starts_with("image/") {
            return essence;
        }
    }
    mime_guess::from_path(url.path())
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "image/jpeg".to_string())
}

fn image_source(page: &Page, img: NodeId) -> Option<String> {
    SOURCE_ATTRS
        .iter()
        .filter_map(|attr| page.attr(img, attr))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty() && !v.starts_with("data:"))
}

/// Replace the source of every `<img>` below `scope` with an inline data URI.
///
/// Relative sources are resolved against `base`. Images that cannot be
/// fetched are removed rather than left pointing at the network, and
/// `<picture><source>` alternatives are dropped. Returns how many images were
/// inlined.
#[instrument(level = "info", skip_all, fields(base = %base))]
pub async fn inline_images<F: Fetch>(
    fetcher: &F,
    page: &mut Page,
    scope: NodeId,
    base: &Url,
) -> Result<usize, ExtractError> {
    page.remove_all(scope, "picture source")?;

    let mut inlined = 0usize;
    for img in page.select_in(scope, "img")? {
        let Some(src) = image_source(page, img) else {
            // Already inline, or no source at all.
            if page.attr(img, "src").is_none_or(|s| !s.starts_with("data:")) {
                page.remove(img);
            } else {
                for attr in EXTERNAL_ATTRS {
                    page.strip_attr(img, attr);
                }
            }
            continue;
        };

        let url = match base.join(&src) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                debug!(%src, "Dropping image with unusable source");
                page.remove(img);
                continue;
            }
        };

        match fetcher.asset(url.as_str()).await {
            Ok(asset) => {
                let mime = image_mime(asset.content_type.as_deref(), &url);
                page.set_attr(img, "src", &data_uri(&mime, &asset.bytes));
                for attr in EXTERNAL_ATTRS {
                    page.strip_attr(img, attr);
                }
                inlined += 1;
            }
            Err(e) => {
                warn!(%url, error = %e, "Image fetch failed; dropping image");
                page.remove(img);
            }
        }
    }

    debug!(inlined, "Inlined images");
    Ok(inlined)
}
