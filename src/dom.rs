//! Parsed-page editing shared by every strategy.
//!
//! [`Page`] edits the `scraper` document tree in place: removals detach
//! subtrees, attribute changes rebuild the element, and new markup is parsed
//! as a fragment and grafted into the tree. Serialization goes through
//! `scraper`'s html5ever serializer.
//!
//! `<script>`, `<style>` and `<noscript>` are removed as soon as a page is
//! parsed.

use ego_tree::NodeId;
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, QualName, ns};
use once_cell::sync::Lazy;
use scraper::node::{Element, Text};
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::ExtractError;

static ALWAYS_REMOVED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script, style, noscript").expect("static selector"));

/// What a [`CleaningRule`] does to each element its selector matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Detach the element and its subtree.
    Remove,
    /// Drop one attribute from the element.
    StripAttr(&'static str),
    /// Replace the element and its subtree with plain text.
    Placeholder(&'static str),
}

/// One removal/transform directive, applied in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct CleaningRule {
    pub selector: &'static str,
    pub action: Action,
}

impl CleaningRule {
    pub const fn remove(selector: &'static str) -> Self {
        Self {
            selector,
            action: Action::Remove,
        }
    }

    pub const fn strip_attr(selector: &'static str, attr: &'static str) -> Self {
        Self {
            selector,
            action: Action::StripAttr(attr),
        }
    }

    pub const fn placeholder(selector: &'static str, text: &'static str) -> Self {
        Self {
            selector,
            action: Action::Placeholder(text),
        }
    }
}

/// Compile a CSS selector, mapping parse failures to [`ExtractError::Selector`].
pub fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{css}: {e}")))
}

/// Escape text for element content or a double-quoted attribute in
/// hand-built markup.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn html_name(name: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(name))
}

fn attribute(name: &str, value: &str) -> Attribute {
    Attribute {
        name: QualName::new(None, ns!(), LocalName::from(name)),
        value: StrTendril::from_slice(value),
    }
}

fn text_node(text: &str) -> Node {
    Node::Text(Text {
        text: scraper::StrTendril::from_slice(text),
    })
}

/// A parsed document being cleaned for one extraction.
pub struct Page {
    doc: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        let mut page = Self {
            doc: Html::parse_document(html),
        };
        let noise: Vec<NodeId> = page.doc.select(&ALWAYS_REMOVED).map(|e| e.id()).collect();
        for id in noise {
            page.detach(id);
        }
        page
    }

    /// The `<html>` element.
    pub fn root(&self) -> NodeId {
        self.doc.root_element().id()
    }

    /// Borrow an element for read-only traversal with the `scraper` API.
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.doc.tree.get(id).and_then(ElementRef::wrap)
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.doc.tree.get_mut(id) {
            node.detach();
        }
    }

    /// `id` is still attached below `scope`.
    fn is_live(&self, id: NodeId, scope: NodeId) -> bool {
        self.doc
            .tree
            .get(id)
            .is_some_and(|node| node.ancestors().any(|a| a.id() == scope))
    }

    /// Text of the document `<title>`, trimmed.
    pub fn title(&self) -> Option<String> {
        let title_selector = selector("title").ok()?;
        let title = self.doc.select(&title_selector).next()?;
        let text = normalize_whitespace(&title.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    }

    /// First element in the whole document matching `css`.
    pub fn find(&self, css: &str) -> Result<NodeId, ExtractError> {
        self.find_in(self.root(), css)
    }

    /// First element below `scope` matching `css`.
    pub fn find_in(&self, scope: NodeId, css: &str) -> Result<NodeId, ExtractError> {
        self.select_in(scope, css)?
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::missing(css))
    }

    /// Every element below `scope` matching `css`, in document order.
    pub fn select_in(&self, scope: NodeId, css: &str) -> Result<Vec<NodeId>, ExtractError> {
        let compiled = selector(css)?;
        let Some(scope_ref) = self.element(scope) else {
            return Ok(Vec::new());
        };
        Ok(scope_ref
            .select(&compiled)
            .map(|e| e.id())
            .filter(|&id| id != scope)
            .collect())
    }

    /// Element children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.doc
            .tree
            .get(id)
            .map(|n| {
                n.children()
                    .filter(|c| c.value().is_element())
                    .map(|c| c.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tag name of an element.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.value().name())
    }

    /// Whitespace-normalized text content of an element.
    pub fn text(&self, id: NodeId) -> String {
        self.element(id)
            .map(|e| normalize_whitespace(&e.text().collect::<String>()))
            .unwrap_or_default()
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.element(id)
            .and_then(|e| e.value().attr(name))
            .map(str::to_string)
    }

    /// Detach `id` and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Remove every element below `scope` matching `css`. Returns the count.
    pub fn remove_all(&mut self, scope: NodeId, css: &'static str) -> Result<usize, ExtractError> {
        self.apply(scope, &[CleaningRule::remove(css)])
    }

    /// Apply `rules` in order to the subtree below `scope`.
    ///
    /// Returns how many elements were removed or changed. Applying the same
    /// rules again to the result changes nothing and returns zero.
    pub fn apply(&mut self, scope: NodeId, rules: &[CleaningRule]) -> Result<usize, ExtractError> {
        let mut changed = 0usize;
        for rule in rules {
            for id in self.select_in(scope, rule.selector)? {
                // An earlier match in this pass may have taken `id` with it.
                if !self.is_live(id, scope) {
                    continue;
                }
                match rule.action {
                    Action::Remove => {
                        self.detach(id);
                        changed += 1;
                    }
                    Action::StripAttr(name) => {
                        if self.strip_attr(id, name) {
                            changed += 1;
                        }
                    }
                    Action::Placeholder(text) => {
                        if let Some(mut node) = self.doc.tree.get_mut(id) {
                            node.insert_before(text_node(text));
                            node.detach();
                            changed += 1;
                        }
                    }
                }
            }
        }
        Ok(changed)
    }

    /// Rebuild element `id` with the attribute list produced by `edit`.
    fn edit_attrs(&mut self, id: NodeId, edit: impl FnOnce(&mut Vec<Attribute>)) {
        let Some(mut node) = self.doc.tree.get_mut(id) else {
            return;
        };
        let Node::Element(element) = node.value() else {
            return;
        };
        let name = element.name.clone();
        let mut attrs: Vec<Attribute> = Vec::new();
        for (key, value) in &element.attrs {
            attrs.push(Attribute {
                name: key.clone(),
                value: StrTendril::from_slice(value),
            });
        }
        edit(&mut attrs);
        *node.value() = Node::Element(Element::new(name, attrs));
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.edit_attrs(id, |attrs| {
            match attrs.iter_mut().find(|a| &*a.name.local == name) {
                Some(existing) => existing.value = StrTendril::from_slice(value),
                None => attrs.push(attribute(name, value)),
            }
        });
    }

    /// Drop attribute `name`. Returns whether it was present.
    pub fn strip_attr(&mut self, id: NodeId, name: &str) -> bool {
        if self.attr(id, name).is_none() {
            return false;
        }
        self.edit_attrs(id, |attrs| attrs.retain(|a| &*a.name.local != name));
        true
    }

    /// Drop every attribute of `id` except those in `keep`.
    pub fn retain_attrs(&mut self, id: NodeId, keep: &[&str]) {
        self.edit_attrs(id, |attrs| attrs.retain(|a| keep.contains(&&*a.name.local)));
    }

    /// Parse `html` as a body fragment into this tree and return its
    /// top-level nodes, still unattached.
    fn adopt_fragment(&mut self, html: &str) -> Vec<NodeId> {
        let fragment = Html::parse_fragment(html);
        let merged = self.doc.tree.extend_tree(fragment.tree).id();
        let Some(root) = self.doc.tree.get(merged) else {
            return Vec::new();
        };
        // The fragment root holds a single <html> wrapper.
        root.children()
            .filter(|c| c.value().is_element())
            .flat_map(|wrapper| wrapper.children().map(|c| c.id()))
            .collect()
    }

    fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self
            .doc
            .tree
            .get(id)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default();
        for child in children {
            self.detach(child);
        }
    }

    /// Replace the content of `id` with parsed `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        self.clear_children(id);
        let nodes = self.adopt_fragment(html);
        if let Some(mut target) = self.doc.tree.get_mut(id) {
            for node in nodes {
                target.append_id(node);
            }
        }
    }

    /// Replace the content of a headline element with a link to `href`
    /// labelled `label`.
    pub fn rewrite_headline(&mut self, id: NodeId, href: &str, label: &str) {
        self.clear_children(id);
        let Some(mut headline) = self.doc.tree.get_mut(id) else {
            return;
        };
        let anchor = Element::new(html_name("a"), vec![attribute("href", href)]);
        headline.append(Node::Element(anchor)).append(text_node(label));
    }

    /// Insert parsed `html` right after `id`. Does nothing when `id` has no
    /// parent.
    pub fn insert_after(&mut self, id: NodeId, html: &str) {
        if self.doc.tree.get(id).and_then(|n| n.parent()).is_none() {
            return;
        }
        let mut anchor = id;
        for node in self.adopt_fragment(html) {
            let Some(mut current) = self.doc.tree.get_mut(anchor) else {
                return;
            };
            anchor = current.insert_id_after(node).id();
        }
    }

    /// Serialize `id` and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        self.element(id).map(|e| e.html()).unwrap_or_default()
    }

    /// Serialize only the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        self.element(id).map(|e| e.inner_html()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_count(page: &Page, scope: NodeId) -> usize {
        page.select_in(scope, "*").unwrap().len()
    }

    const RULES: &[CleaningRule] = &[
        CleaningRule::remove("div.share-bar"),
        CleaningRule::remove("aside, figure"),
        CleaningRule::remove("[id^='div-gpt-ad']"),
        CleaningRule::strip_attr("p", "class"),
        CleaningRule::placeholder("div.paywall", "[subscriber content]"),
    ];

    const ARTICLE: &str = r#"<html><head><title> Budget  day </title><script>var x = 1;</script></head>
        <body><article id="story">
          <h1 class="headline">Budget 2021 Explained</h1>
          <div class="share-bar"><a href="https://t.co">share</a><img src="https://x/share.png"></div>
          <p class="lead">First <b>bold</b> paragraph &amp; more.</p>
          <aside><p>Related</p></aside>
          <div id="div-gpt-ad-123">ad</div>
          <figure><img src="https://x/fig.jpg"></figure>
          <div class="paywall"><p>Subscribe now</p></div>
          <p>Second paragraph.</p>
        </article></body></html>"#;

    #[test]
    fn test_parse_drops_scripts_and_reads_title() {
        let page = Page::parse(ARTICLE);
        assert_eq!(page.title().as_deref(), Some("Budget day"));
        assert!(!page.outer_html(page.root()).contains("var x"));
    }

    #[test]
    fn test_apply_removes_and_rewrites() {
        let mut page = Page::parse(ARTICLE);
        let story = page.find("article#story").unwrap();
        let changed = page.apply(story, RULES).unwrap();
        // share-bar, aside, figure, ad, class on p.lead, paywall
        assert_eq!(changed, 6);

        let html = page.outer_html(story);
        assert!(!html.contains("share"));
        assert!(!html.contains("Related"));
        assert!(!html.contains("div-gpt-ad"));
        assert!(!html.contains("fig.jpg"));
        assert!(!html.contains("Subscribe now"));
        assert!(html.contains("[subscriber content]"));
        assert!(html.contains("<p>First <b>bold</b> paragraph &amp; more.</p>"));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let mut page = Page::parse(ARTICLE);
        let story = page.find("article#story").unwrap();
        page.apply(story, RULES).unwrap();
        assert_eq!(page.apply(story, RULES).unwrap(), 0);

        let cleaned = page.outer_html(story);
        let mut reparsed = Page::parse(&cleaned);
        let story = reparsed.find("article#story").unwrap();
        let before = element_count(&reparsed, story);
        assert_eq!(reparsed.apply(story, RULES).unwrap(), 0);
        assert_eq!(element_count(&reparsed, story), before);
    }

    #[test]
    fn test_removed_subtrees_are_not_selectable() {
        let mut page = Page::parse(ARTICLE);
        let story = page.find("article#story").unwrap();
        assert_eq!(page.select_in(story, "img").unwrap().len(), 2);
        page.apply(story, RULES).unwrap();
        assert!(page.select_in(story, "img").unwrap().is_empty());
    }

    #[test]
    fn test_rewrite_headline_links_label() {
        let mut page = Page::parse(ARTICLE);
        let h1 = page.find("h1.headline").unwrap();
        page.rewrite_headline(h1, "https://example.com/a?b=1&c=2", "3_Budget 2021 Explained");
        assert_eq!(
            page.outer_html(h1),
            "<h1 class=\"headline\"><a href=\"https://example.com/a?b=1&amp;c=2\">3_Budget 2021 Explained</a></h1>"
        );
    }

    #[test]
    fn test_attribute_rewrites_and_insert_after() {
        let mut page = Page::parse(r#"<div><img src="a.png" srcset="a2.png 2x" alt="x"></div>"#);
        let img = page.find("img").unwrap();
        page.set_attr(img, "src", "data:image/png;base64,AA==");
        page.retain_attrs(img, &["src"]);
        page.insert_after(img, "<p>caption</p>");
        assert_eq!(page.attr(img, "srcset"), None);
        assert_eq!(page.attr(img, "src").as_deref(), Some("data:image/png;base64,AA=="));
        let div = page.find("div").unwrap();
        assert_eq!(
            page.outer_html(div),
            "<div><img src=\"data:image/png;base64,AA==\"><p>caption</p></div>"
        );
    }

    #[test]
    fn test_find_reports_missing_selector() {
        let page = Page::parse("<html><body><p>hi</p></body></html>");
        match page.find("h1.title") {
            Err(ExtractError::Missing { selector }) => assert_eq!(selector, "h1.title"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_scope_itself_is_never_matched() {
        let mut page = Page::parse(r#"<div class="content"><div class="content">inner</div></div>"#);
        let outer = page.find("div.content").unwrap();
        assert_eq!(page.remove_all(outer, "div.content").unwrap(), 1);
        assert_eq!(page.outer_html(outer), "<div class=\"content\"></div>");
    }

    #[test]
    fn test_set_inner_html_grafts_parsed_markup() {
        let mut page = Page::parse("<div id=\"box\"><!-- keep --><span>old</span></div>");
        let div = page.find("div#box").unwrap();
        page.set_inner_html(div, "<em>new</em> &amp; <b>bold</b>");
        assert_eq!(page.outer_html(div), "<div id=\"box\"><em>new</em> &amp; <b>bold</b></div>");
        let em = page.find_in(div, "em").unwrap();
        assert_eq!(page.text(em), "new");
    }

    #[test]
    fn test_serialization_keeps_comments() {
        let page = Page::parse("<div id=\"box\"><!-- note --><p>a &lt; b</p></div>");
        let div = page.find("div#box").unwrap();
        assert_eq!(page.outer_html(div), "<div id=\"box\"><!-- note --><p>a &lt; b</p></div>");
    }
}
