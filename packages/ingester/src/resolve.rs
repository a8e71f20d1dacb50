//! Landing page to full-text document resolution.
//!
//! Justice Laws serves each act under an index page that only links to the
//! consolidated text (`FullText.html` / `TexteComplet.html`). Segmenting the
//! index page yields nothing useful, so the link is followed first.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::normalize::SourceDocument;

/// Justice Laws host.
pub const JUSTICE_LAWS_HOST: &str = "laws-lois.justice.gc.ca";

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FULL_TEXT_LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(TexteComplet|textecomplet|FullText)\.html").expect("valid regex"));

/// Resolves landing pages of a publishing site to their full-text view.
#[derive(Debug, Clone)]
pub struct FullTextResolver {
    hosts: Vec<String>,
    url_markers: Vec<String>,
    link_pattern: Regex,
}

impl FullTextResolver {
    /// Create a resolver.
    ///
    /// `url_markers` are matched case-insensitively against the page URL;
    /// a URL containing one is already a full-text view.
    #[must_use]
    pub fn new(
        hosts: impl IntoIterator<Item = impl Into<String>>,
        url_markers: impl IntoIterator<Item = impl Into<String>>,
        link_pattern: Regex,
    ) -> Self {
        Self {
            hosts: hosts.into_iter().map(|h| h.into().to_lowercase()).collect(),
            url_markers: url_markers
                .into_iter()
                .map(|m| m.into().to_lowercase())
                .collect(),
            link_pattern,
        }
    }

    /// Resolver for the federal Justice Laws site.
    #[must_use]
    pub fn justice_laws() -> Self {
        Self::new(
            [JUSTICE_LAWS_HOST],
            ["textecomplet.html", "fulltext.html", "page-"],
            FULL_TEXT_LINK_PATTERN.clone(),
        )
    }

    /// Whether `url` is served by one of the resolver's hosts.
    #[must_use]
    pub fn handles(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        self.hosts.iter().any(|h| host.contains(h.as_str()))
    }

    /// Whether `url` already points at a full-text view.
    #[must_use]
    pub fn is_full_text_url(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.url_markers.iter().any(|m| lower.contains(m.as_str()))
    }

    /// Whether the page at `url` should be resolved before segmentation.
    #[must_use]
    pub fn needs_resolution(&self, url: &str) -> bool {
        self.handles(url) && !self.is_full_text_url(url)
    }

    /// Find the full-text link of a landing page.
    ///
    /// Takes the first hyperlink whose target matches the link pattern and
    /// returns it as an absolute URL, or `None` when the page has no such
    /// link.
    #[must_use]
    pub fn resolve(&self, document: &SourceDocument, current_url: &str) -> Option<String> {
        let href = document
            .link_targets()
            .map(str::trim)
            .find(|href| self.link_pattern.is_match(href))?;

        let resolved = absolutize(href, current_url);
        if resolved.is_none() {
            tracing::warn!(href, current_url, "Could not make full-text link absolute");
        }
        resolved
    }
}

/// Make `href` absolute relative to the page at `current_url`.
///
/// Absolute `http(s)` targets are returned unchanged, root-relative targets
/// are joined to the page origin and document-relative targets to the page
/// path. A final path segment without an extension is a directory, so
/// `acts/C-46` + `FullText.html` gives `acts/C-46/FullText.html`.
///
/// # Examples
/// ```
/// use statute_ingester::resolve::absolutize;
///
/// let page = "https://laws-lois.justice.gc.ca/eng/acts/C-46/index.html";
/// assert_eq!(
///     absolutize("FullText.html", page).as_deref(),
///     Some("https://laws-lois.justice.gc.ca/eng/acts/C-46/FullText.html")
/// );
/// assert_eq!(
///     absolutize("/fra/lois/C-46/TexteComplet.html", page).as_deref(),
///     Some("https://laws-lois.justice.gc.ca/fra/lois/C-46/TexteComplet.html")
/// );
/// ```
#[must_use]
pub fn absolutize(href: &str, current_url: &str) -> Option<String> {
    let lower = href.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(href.to_string());
    }

    let mut base = Url::parse(current_url).ok()?;
    let last_segment = base
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_string();
    if !last_segment.is_empty() && !last_segment.contains('.') {
        let directory = format!("{}/", base.path());
        base.set_path(&directory);
    }

    base.join(href).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INDEX: &str = "https://laws-lois.justice.gc.ca/eng/acts/C-46/";

    #[test]
    fn test_needs_resolution_only_for_index_pages() {
        let resolver = FullTextResolver::justice_laws();
        assert!(resolver.needs_resolution(INDEX));
        assert!(resolver.needs_resolution("https://laws-lois.justice.gc.ca/eng/acts/C-46/index.html"));
        assert!(!resolver.needs_resolution("https://laws-lois.justice.gc.ca/eng/acts/C-46/FullText.html"));
        assert!(!resolver.needs_resolution("https://laws-lois.justice.gc.ca/fra/lois/C-46/TexteComplet.html"));
        assert!(!resolver.needs_resolution("https://laws-lois.justice.gc.ca/eng/acts/C-46/page-3.html"));
    }

    #[test]
    fn test_other_hosts_are_not_resolved() {
        let resolver = FullTextResolver::justice_laws();
        assert!(!resolver.needs_resolution("https://www.legisquebec.gouv.qc.ca/fr/document/lc/C-25.01"));
        assert!(!resolver.needs_resolution("not a url"));
    }

    #[test]
    fn test_resolve_relative_link() {
        let document = SourceDocument::parse(
            r#"<body><a href="index.html">Index</a><a href="FullText.html">Full Document</a></body>"#,
        );
        let resolved = FullTextResolver::justice_laws().resolve(&document, INDEX);
        assert_eq!(
            resolved.as_deref(),
            Some("https://laws-lois.justice.gc.ca/eng/acts/C-46/FullText.html")
        );
    }

    #[test]
    fn test_resolve_takes_first_match() {
        let document = SourceDocument::parse(
            r#"<body><a href="/fra/lois/C-46/TexteComplet.html">Texte complet</a>
               <a href="FullText.html">Full</a></body>"#,
        );
        let resolved = FullTextResolver::justice_laws().resolve(&document, INDEX);
        assert_eq!(
            resolved.as_deref(),
            Some("https://laws-lois.justice.gc.ca/fra/lois/C-46/TexteComplet.html")
        );
    }

    #[test]
    fn test_resolve_absolute_link_unchanged() {
        let document = SourceDocument::parse(
            r#"<a href="https://laws-lois.justice.gc.ca/eng/acts/A-1/FullText.html">Full</a>"#,
        );
        let resolved = FullTextResolver::justice_laws().resolve(&document, INDEX);
        assert_eq!(
            resolved.as_deref(),
            Some("https://laws-lois.justice.gc.ca/eng/acts/A-1/FullText.html")
        );
    }

    #[test]
    fn test_resolve_without_full_text_link() {
        let document = SourceDocument::parse(
            r#"<body><a href="page-1.html">Part 1</a><a href="/eng/acts/">Acts</a></body>"#,
        );
        assert!(FullTextResolver::justice_laws().resolve(&document, INDEX).is_none());
    }

    #[test]
    fn test_absolutize_directory_without_trailing_slash() {
        assert_eq!(
            absolutize("FullText.html", "https://laws-lois.justice.gc.ca/eng/acts/C-46").as_deref(),
            Some("https://laws-lois.justice.gc.ca/eng/acts/C-46/FullText.html")
        );
    }

    #[test]
    fn test_absolutize_drops_query() {
        assert_eq!(
            absolutize("FullText.html", "https://laws-lois.justice.gc.ca/eng/acts/C-46/?wbdisable=true").as_deref(),
            Some("https://laws-lois.justice.gc.ca/eng/acts/C-46/FullText.html")
        );
    }

    #[test]
    fn test_absolutize_invalid_base() {
        assert!(absolutize("FullText.html", "relative/page").is_none());
    }
}
