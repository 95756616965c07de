//! Plain-text digest of a printable article.

use crate::dom::Page;

/// Text of every `<p>` in `html`, whitespace-normalized, empty ones skipped,
/// joined by blank lines.
pub fn digest(html: &str) -> String {
    let page = Page::parse(html);
    let root = page.root();
    page.select_in(root, "p")
        .unwrap_or_default()
        .into_iter()
        .map(|p| page.text(p))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
