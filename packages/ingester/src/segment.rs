//! Per-document segmentation: profile dispatch, full-text resolution,
//! boundary detection, extraction and deduplication.

use crate::config::SNIPPET_CHARS;
use crate::dedupe::dedupe_records;
use crate::error::{IngesterError, Result};
use crate::extract::extract_provisions;
use crate::http::PageFetcher;
use crate::normalize::{snippet, SourceDocument};
use crate::profile::{JurisdictionProfile, ProfileRegistry};
use crate::types::{Jurisdiction, LawContext, ProvisionRecord};

/// Result of segmenting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// Provisions were extracted.
    Segmented(SegmentedDocument),

    /// No profile is registered for the jurisdiction. Not an error: the
    /// caller logs it and moves on.
    Unsupported(Jurisdiction),
}

/// Provisions of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedDocument {
    /// Deduplicated records, never empty.
    pub records: Vec<ProvisionRecord>,

    /// URL the records were extracted from (the full-text URL when resolved).
    pub source_url: String,

    /// Detector that produced the boundaries.
    pub strategy: &'static str,
}

/// Segment a fetched page.
///
/// For profiles with a resolver, a landing page is first resolved to its
/// full-text document, which is fetched through `fetcher` and replaces the
/// page. Without a resolvable link the original page is segmented as is.
///
/// # Errors
/// * `ZeroRecords` when no provision survives extraction
/// * any fetch error raised while re-fetching the full-text document
pub fn segment_document(
    profiles: &ProfileRegistry,
    law: &LawContext,
    html: String,
    fetcher: &dyn PageFetcher,
) -> Result<SegmentOutcome> {
    let Some(profile) = profiles.get(law.jurisdiction) else {
        return Ok(SegmentOutcome::Unsupported(law.jurisdiction));
    };

    let (html, source_url) = resolve_full_text(profile, law, html, fetcher)?;
    let document = SourceDocument::parse(&html);
    let (records, strategy) = segment_parsed(profile, law, &document);

    match strategy {
        Some(strategy) if !records.is_empty() => {
            tracing::info!(
                law_key = %law.law_key,
                strategy,
                provisions = records.len(),
                "Segmented document"
            );
            Ok(SegmentOutcome::Segmented(SegmentedDocument {
                records,
                source_url,
                strategy,
            }))
        }
        _ => Err(IngesterError::ZeroRecords {
            law_key: law.law_key.clone(),
            code_id: law.code_id.clone(),
            jurisdiction: law.jurisdiction.to_string(),
            snippet: snippet(&document.main_text(), SNIPPET_CHARS),
        }),
    }
}

/// Run detection, extraction and deduplication on raw HTML.
///
/// Pure: no fetch, no resolution. Returns the records (possibly empty) and
/// the accepted strategy, if any.
#[must_use]
pub fn segment_html(
    profile: &JurisdictionProfile,
    law: &LawContext,
    html: &str,
) -> (Vec<ProvisionRecord>, Option<&'static str>) {
    segment_parsed(profile, law, &SourceDocument::parse(html))
}

fn segment_parsed(
    profile: &JurisdictionProfile,
    law: &LawContext,
    document: &SourceDocument,
) -> (Vec<ProvisionRecord>, Option<&'static str>) {
    let Some(detection) = profile.chain.detect(document) else {
        return (Vec::new(), None);
    };

    let records = extract_provisions(
        &detection,
        law,
        &profile.citation_marker,
        profile.min_body_chars,
    );
    (dedupe_records(records), Some(detection.strategy))
}

/// Swap a landing page for its full-text document when the profile asks for it.
fn resolve_full_text(
    profile: &JurisdictionProfile,
    law: &LawContext,
    html: String,
    fetcher: &dyn PageFetcher,
) -> Result<(String, String)> {
    let Some(resolver) = profile.resolver.as_ref() else {
        return Ok((html, law.source_url.clone()));
    };
    if !resolver.needs_resolution(&law.source_url) {
        return Ok((html, law.source_url.clone()));
    }

    let resolved = resolver.resolve(&SourceDocument::parse(&html), &law.source_url);
    match resolved {
        Some(full_url) => {
            tracing::info!(
                law_key = %law.law_key,
                from = %law.source_url,
                to = %full_url,
                "Resolved full-text document"
            );
            let full_html = fetcher.fetch(&full_url)?;
            Ok((full_html, full_url))
        }
        None => {
            tracing::warn!(
                law_key = %law.law_key,
                url = %law.source_url,
                "No full-text link found, segmenting landing page"
            );
            Ok((html, law.source_url.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentationConfig;
    use crate::profile::create_default_profiles;
    use std::cell::RefCell;

    const BODY: &str = "applies to every person who carries on an activity described in this Part of the Act.";

    fn profiles() -> ProfileRegistry {
        create_default_profiles(&SegmentationConfig::default()).unwrap()
    }

    fn no_fetch(url: &str) -> Result<String> {
        Err(IngesterError::Registry(format!("unexpected fetch of {url}")))
    }

    fn federal_law(url: &str) -> LawContext {
        LawContext::new("criminal_code", "C-46", Jurisdiction::Federal, url).with_bucket("CA")
    }

    fn federal_dom_page(sections: usize) -> String {
        let mut html = String::from("<html><body><nav><div class=\"section\">1 Menu entry that should never become a provision at all</div></nav><main>");
        for n in 1..=sections {
            html.push_str(&format!(
                r#"<section class="section" id="s-{n}"><h2>{n}</h2><p>Section {n} {BODY}</p></section>"#
            ));
        }
        html.push_str("</main></body></html>");
        html
    }

    fn federal_text_page() -> String {
        format!(
            "<main><p>1 Short title</p><p>This Act may be cited as the Example Act, {BODY}</p>\
             <p>2 Interpretation</p><p>In this Act, words {BODY}</p></main>"
        )
    }

    #[test]
    fn test_unknown_jurisdiction_is_skipped() {
        let law = LawContext::new("lrc", "LRC", Jurisdiction::Other, "https://example.org");
        let outcome = segment_document(&profiles(), &law, "<p>1. x</p>".to_string(), &no_fetch).unwrap();
        assert_eq!(outcome, SegmentOutcome::Unsupported(Jurisdiction::Other));
    }

    #[test]
    fn test_quebec_dot_profile() {
        let law = LawContext::new("ccq", "CCQ", Jurisdiction::Quebec, "https://www.legisquebec.gouv.qc.ca/fr/document/lc/CCQ-1991");
        let html = format!("<main><p>1. Toute personne {BODY}</p><p>2. Toute personne encore {BODY}</p></main>");

        let SegmentOutcome::Segmented(doc) = segment_document(&profiles(), &law, html, &no_fetch).unwrap() else {
            panic!("expected segmented document");
        };
        let citations: Vec<_> = doc.records.iter().map(|r| r.citation.as_str()).collect();
        assert_eq!(citations, vec!["art. 1 CCQ", "art. 2 CCQ"]);
        assert_eq!(doc.strategy, "numeric-dot");
        assert!(doc.records[0].text.starts_with("Toute personne applies"));
    }

    #[test]
    fn test_federal_dom_strategy_used_above_threshold() {
        let law = federal_law("https://laws-lois.justice.gc.ca/eng/acts/C-46/FullText.html");
        let SegmentOutcome::Segmented(doc) =
            segment_document(&profiles(), &law, federal_dom_page(20), &no_fetch).unwrap()
        else {
            panic!("expected segmented document");
        };
        assert_eq!(doc.strategy, "section-element");
        assert_eq!(doc.records.len(), 20);
        assert_eq!(doc.records[0].citation, "s. 1 C-46");
        assert!(doc.records[0].text.starts_with("Section 1 applies"));
    }

    #[test]
    fn test_federal_falls_back_below_threshold() {
        let law = federal_law("https://laws-lois.justice.gc.ca/eng/acts/C-46/FullText.html");
        let SegmentOutcome::Segmented(doc) =
            segment_document(&profiles(), &law, federal_dom_page(19), &no_fetch).unwrap()
        else {
            panic!("expected segmented document");
        };
        assert_eq!(doc.strategy, "heading-line");
        // Each section renders as "<n>\nSection <n> ...": the heading-line
        // pattern picks up the number line followed by the capitalized body.
        assert_eq!(doc.records.len(), 19);
    }

    #[test]
    fn test_federal_text_fallback() {
        let law = federal_law("https://laws-lois.justice.gc.ca/eng/acts/E-1/FullText.html");
        let SegmentOutcome::Segmented(doc) =
            segment_document(&profiles(), &law, federal_text_page(), &no_fetch).unwrap()
        else {
            panic!("expected segmented document");
        };
        let citations: Vec<_> = doc.records.iter().map(|r| r.citation.as_str()).collect();
        assert_eq!(citations, vec!["s. 1 C-46", "s. 2 C-46"]);
        assert!(doc.records[0].text.starts_with("Short title\nThis Act may be cited"));
    }

    #[test]
    fn test_federal_resolves_and_refetches() {
        let index_url = "https://laws-lois.justice.gc.ca/eng/acts/C-46/";
        let law = federal_law(index_url);
        let index = r#"<html><body><main><a href="FullText.html">Full Document</a></main></body></html>"#;
        let requested = RefCell::new(Vec::new());
        let fetcher = |url: &str| -> Result<String> {
            requested.borrow_mut().push(url.to_string());
            Ok(federal_text_page())
        };

        let SegmentOutcome::Segmented(doc) =
            segment_document(&profiles(), &law, index.to_string(), &fetcher).unwrap()
        else {
            panic!("expected segmented document");
        };
        let full_url = "https://laws-lois.justice.gc.ca/eng/acts/C-46/FullText.html";
        assert_eq!(requested.into_inner(), vec![full_url.to_string()]);
        assert_eq!(doc.source_url, full_url);
        assert_eq!(doc.records.len(), 2);
    }

    #[test]
    fn test_unresolvable_index_page_fails_with_zero_records() {
        let law = federal_law("https://laws-lois.justice.gc.ca/eng/acts/C-46/");
        let index = "<main><h1>Criminal Code</h1><a href=\"page-1.html\">Part I</a></main>";

        let err = segment_document(&profiles(), &law, index.to_string(), &no_fetch).unwrap_err();
        match err {
            IngesterError::ZeroRecords { law_key, snippet, jurisdiction, .. } => {
                assert_eq!(law_key, "criminal_code");
                assert_eq!(jurisdiction, "CA-FED");
                assert_eq!(snippet, "Criminal Code Part I");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_refetch_error_propagates() {
        let law = federal_law("https://laws-lois.justice.gc.ca/eng/acts/C-46/");
        let index = r#"<a href="FullText.html">Full</a>"#;
        let failing = |url: &str| -> Result<String> {
            Err(IngesterError::HttpStatus {
                url: url.to_string(),
                status: 503,
            })
        };
        let err = segment_document(&profiles(), &law, index.to_string(), &failing).unwrap_err();
        assert!(matches!(err, IngesterError::HttpStatus { status: 503, .. }));
    }

    #[test]
    fn test_quebec_page_without_articles() {
        let law = LawContext::new("cpc_qc", "CPC", Jurisdiction::Quebec, "https://example.org");
        let err = segment_document(&profiles(), &law, "<main>Page introuvable</main>".to_string(), &no_fetch)
            .unwrap_err();
        assert!(matches!(err, IngesterError::ZeroRecords { .. }));
    }

    #[test]
    fn test_segment_html_is_deterministic() {
        let profiles = profiles();
        let profile = profiles.get(Jurisdiction::Federal).unwrap();
        let law = federal_law("https://laws-lois.justice.gc.ca/eng/acts/C-46/FullText.html");
        let html = federal_dom_page(25);

        let first = segment_html(profile, &law, &html);
        let second = segment_html(profile, &law, &html);
        assert_eq!(first, second);
        assert!(first.0.iter().all(|r| r.text.chars().count() >= 60));
    }
}
