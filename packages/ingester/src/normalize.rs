//! HTML parsing and text normalization.
//!
//! Statute pages carry a lot of chrome (menus, breadcrumbs, footers, scripts).
//! Everything here works on the content region only: `<main>` when the page
//! has one, otherwise `<body>`.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose content is never rendered as text.
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Page chrome regions.
const CHROME_TAGS: &[&str] = &["header", "footer", "nav", "aside"];

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static MAIN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Check whether an element and its subtree are excluded from extraction.
fn is_excluded(tag: &str) -> bool {
    NON_RENDERED_TAGS.contains(&tag) || CHROME_TAGS.contains(&tag)
}

/// Check whether an element sits inside an excluded region.
fn is_inside_excluded(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_excluded(ancestor.value().name()))
}

/// A parsed statute page.
///
/// Transient: built per document and dropped once segmentation is done.
pub struct SourceDocument {
    html: Html,
}

impl SourceDocument {
    /// Parse an HTML page. Parsing never fails; malformed markup is repaired.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// The primary content container: first `<main>` outside chrome, else
    /// `<body>`, else the document element.
    #[must_use]
    pub fn content_root(&self) -> ElementRef<'_> {
        self.html
            .select(&MAIN_SELECTOR)
            .find(|main| !is_inside_excluded(*main))
            .or_else(|| self.html.select(&BODY_SELECTOR).next())
            .unwrap_or_else(|| self.html.root_element())
    }

    /// Normalized visible text of the content region.
    #[must_use]
    pub fn main_text(&self) -> String {
        element_text(self.content_root())
    }

    /// All elements of the content region in document order, chrome and
    /// non-rendered subtrees excluded.
    #[must_use]
    pub fn content_elements(&self) -> Vec<ElementRef<'_>> {
        let mut elements = Vec::new();
        collect_elements(self.content_root(), &mut elements);
        elements
    }

    /// `href` targets of every hyperlink on the page, in document order.
    ///
    /// Chrome is included on purpose: the full-text link of a landing page
    /// often lives in a side menu.
    pub fn link_targets(&self) -> impl Iterator<Item = &str> {
        self.html
            .select(&LINK_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
    }
}

/// Visible text of an element.
///
/// Every text node is trimmed, empty ones are dropped and the rest are joined
/// with line breaks, so block boundaries survive as line boundaries.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    collect_text(element, &mut parts);
    normalize_text(&parts.join("\n"))
}

fn collect_text<'a>(element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !is_excluded(child_element.value().name()) {
                collect_text(child_element, parts);
            }
        } else if let Node::Text(text) = child.value() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }
}

fn collect_elements<'a>(element: ElementRef<'a>, out: &mut Vec<ElementRef<'a>>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        if is_excluded(child.value().name()) {
            continue;
        }
        out.push(child);
        collect_elements(child, out);
    }
}

/// Replace non-breaking spaces and trim.
///
/// # Examples
/// ```
/// use statute_ingester::normalize::normalize_text;
///
/// assert_eq!(normalize_text("  art.\u{a0}12 "), "art. 12");
/// ```
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.replace('\u{a0}', " ").trim().to_string()
}

/// Parse `html` and return the normalized text of its content region.
///
/// # Examples
/// ```
/// use statute_ingester::normalize::extract_main_text;
///
/// let html = "<body><nav>Menu</nav><main><p>1. Texte</p></main></body>";
/// assert_eq!(extract_main_text(html), "1. Texte");
/// assert_eq!(extract_main_text(""), "");
/// ```
#[must_use]
pub fn extract_main_text(html: &str) -> String {
    SourceDocument::parse(html).main_text()
}

/// First `max_chars` characters of `text` with line breaks flattened to spaces.
#[must_use]
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strips_scripts_and_styles() {
        let html = r#"<html><head><style>p { color: red }</style></head>
            <body><script>var x = 1;</script><p>Visible</p><noscript>Enable JS</noscript></body></html>"#;
        assert_eq!(extract_main_text(html), "Visible");
    }

    #[test]
    fn test_strips_chrome_regions() {
        let html = r#"<body>
            <header>Site title</header>
            <nav><a href="/">Accueil</a></nav>
            <p>Contenu</p>
            <aside>Voir aussi</aside>
            <footer>Copyright</footer>
        </body>"#;
        assert_eq!(extract_main_text(html), "Contenu");
    }

    #[test]
    fn test_prefers_main_over_body() {
        let html = "<body><p>Outside</p><main><p>Inside</p></main></body>";
        assert_eq!(extract_main_text(html), "Inside");
    }

    #[test]
    fn test_ignores_main_inside_chrome() {
        let html = "<body><header><main>Banner</main></header><p>Body text</p></body>";
        assert_eq!(extract_main_text(html), "Body text");
    }

    #[test]
    fn test_block_breaks_become_lines() {
        let html = "<main><h2>1. Titre</h2><p>Premier   alinéa</p><p>Second <b>alinéa</b></p></main>";
        assert_eq!(
            extract_main_text(html),
            "1. Titre\nPremier   alinéa\nSecond\nalinéa"
        );
    }

    #[test]
    fn test_non_breaking_spaces_collapsed() {
        let html = "<main><p>art.\u{a0}1\u{a0}du code</p></main>";
        assert_eq!(extract_main_text(html), "art. 1 du code");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_main_text(""), "");
        assert_eq!(extract_main_text("<html></html>"), "");
    }

    #[test]
    fn test_content_elements_skip_chrome() {
        let doc = SourceDocument::parse(
            r#"<main><nav><div id="s-1">1 Nav</div></nav><div id="s-2"><p>2 Body</p></div></main>"#,
        );
        let ids: Vec<_> = doc
            .content_elements()
            .iter()
            .filter_map(|e| e.value().attr("id"))
            .collect();
        assert_eq!(ids, vec!["s-2"]);
    }

    #[test]
    fn test_link_targets_include_chrome() {
        let doc = SourceDocument::parse(
            r#"<body><nav><a href="FullText.html">Full</a></nav><a>none</a><a href="/x">x</a></body>"#,
        );
        let links: Vec<_> = doc.link_targets().collect();
        assert_eq!(links, vec!["FullText.html", "/x"]);
    }

    #[test]
    fn test_snippet_flattens_lines() {
        assert_eq!(snippet("a\nb\nc", 3), "a b");
        assert_eq!(snippet("court", 100), "court");
    }
}
