//! Provision boundary detection.
//!
//! A detector finds where provisions start. Detectors are arranged in a
//! [`StrategyChain`]: an ordered list of `(detector, acceptance)` steps where
//! the first detector whose output satisfies its acceptance rule wins.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use crate::normalize::{element_text, SourceDocument};

/// Start of a provision inside a [`Detection`] text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryMatch {
    /// Byte offset where the provision starts.
    pub position: usize,

    /// Byte offset where the body starts, after the number or marker token.
    pub marker_end: usize,

    /// Hierarchical decimal number (e.g., "12", "2.1.3").
    pub number: String,

    /// Name of the detector that produced the match.
    pub strategy: &'static str,
}

/// Output of a detector: the text the matches index into and the matches,
/// ordered by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub text: String,
    pub matches: Vec<BoundaryMatch>,
    pub strategy: &'static str,
}

impl Detection {
    /// Number of boundaries found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether no boundary was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Trait for boundary detection strategies.
pub trait BoundaryDetector: Send + Sync {
    /// Short strategy tag used in logs and matches.
    fn name(&self) -> &'static str;

    /// Find provision boundaries.
    ///
    /// `main_text` is the normalized text of the document's content region;
    /// text-based detectors index into it, DOM-based detectors may build
    /// their own text.
    fn detect(&self, document: &SourceDocument, main_text: &str) -> Detection;
}

/// Line-oriented detector driven by a multi-line regex.
///
/// Capture group 1 is the provision number. When `body_group` is set, the
/// body starts at that group; otherwise it starts where the match ends.
pub struct PatternDetector {
    name: &'static str,
    pattern: Regex,
    body_group: Option<usize>,
}

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMERIC_DOT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(\d+(?:\.\d+)?)\s*\.\s+").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEADING_LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\d+(?:\.\d+){0,3})\s+([A-Za-zÉÈÊËÀÂÎÏÔÛÜÇ].+)$").expect("valid regex")
});

impl PatternDetector {
    /// Build a detector from a regex.
    #[must_use]
    pub fn new(name: &'static str, pattern: Regex) -> Self {
        Self {
            name,
            pattern,
            body_group: None,
        }
    }

    /// Start bodies at the given capture group instead of the match end.
    #[must_use]
    pub fn with_body_group(mut self, group: usize) -> Self {
        self.body_group = Some(group);
        self
    }

    /// `12. Texte` / `12.1. Texte`: number, period, whitespace at line start.
    #[must_use]
    pub fn numeric_dot() -> Self {
        Self::new("numeric-dot", NUMERIC_DOT_PATTERN.clone())
    }

    /// A line holding only `<marker> <number>`, e.g. `Article 12`.
    ///
    /// The marker is matched case-insensitively and removed from the body.
    pub fn word_marker(marker: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?mi)^\s*{}\s+(\d+(?:\.\d+)?)\s*$",
            regex::escape(marker)
        ))?;
        Ok(Self::new("word-marker", pattern))
    }

    /// `12 Short title` / `2.1 Définitions`: number followed by a capitalized
    /// heading. Only the number is stripped; the heading stays in the body.
    #[must_use]
    pub fn heading_line() -> Self {
        Self::new("heading-line", HEADING_LINE_PATTERN.clone()).with_body_group(2)
    }
}

impl BoundaryDetector for PatternDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&self, _document: &SourceDocument, main_text: &str) -> Detection {
        let matches = self
            .pattern
            .captures_iter(main_text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let number = caps.get(1)?;
                let marker_end = match self.body_group {
                    Some(group) => caps.get(group).map_or(whole.end(), |g| g.start()),
                    None => whole.end(),
                };
                Some(BoundaryMatch {
                    position: whole.start(),
                    marker_end,
                    number: number.as_str().to_string(),
                    strategy: self.name,
                })
            })
            .collect();

        Detection {
            text: main_text.to_string(),
            matches,
            strategy: self.name,
        }
    }
}

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SECTION_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+){0,3})\b\s*").expect("valid regex"));

/// DOM detector for pages that mark sections up as elements.
///
/// Candidates are elements whose `id` starts with `s-` or contains
/// `section`, or whose class contains `section`. Each candidate's own text
/// becomes one provision, so the detection text is the concatenation of the
/// accepted candidates.
pub struct SectionElementDetector {
    min_candidate_chars: usize,
    min_body_chars: usize,
}

impl SectionElementDetector {
    #[must_use]
    pub fn new(min_candidate_chars: usize, min_body_chars: usize) -> Self {
        Self {
            min_candidate_chars,
            min_body_chars,
        }
    }

    fn has_section_hint(element: ElementRef<'_>) -> bool {
        let value = element.value();
        let id = value.attr("id").unwrap_or_default().to_lowercase();
        let class = value.attr("class").unwrap_or_default().to_lowercase();
        class.contains("section") || id.starts_with("s-") || id.contains("section")
    }
}

impl BoundaryDetector for SectionElementDetector {
    fn name(&self) -> &'static str {
        "section-element"
    }

    fn detect(&self, document: &SourceDocument, _main_text: &str) -> Detection {
        let mut text = String::new();
        let mut matches = Vec::new();
        // One document covers a single (code_id, jurisdiction), so the
        // number alone identifies a provision. Nested wrappers repeat it.
        let mut seen: HashSet<String> = HashSet::new();

        for element in document.content_elements() {
            if !Self::has_section_hint(element) {
                continue;
            }

            let candidate = element_text(element);
            if candidate.chars().count() < self.min_candidate_chars {
                continue;
            }

            let Some(caps) = SECTION_NUMBER_PATTERN.captures(&candidate) else {
                continue;
            };
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let number = number.as_str().to_string();

            if !seen.insert(number.clone()) {
                continue;
            }

            let body = candidate[whole.end()..].trim();
            if body.chars().count() < self.min_body_chars {
                continue;
            }

            if !text.is_empty() {
                text.push('\n');
            }
            let position = text.len();
            text.push_str(&candidate);
            matches.push(BoundaryMatch {
                position,
                marker_end: position + whole.end(),
                number,
                strategy: self.name(),
            });
        }

        Detection {
            text,
            matches,
            strategy: self.name(),
        }
    }
}

/// Rule deciding whether a detector's output is good enough to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// At least this many boundaries.
    AtLeast(usize),
    /// Whatever was found, including nothing.
    Always,
}

impl Acceptance {
    #[must_use]
    pub fn accepts(&self, detection: &Detection) -> bool {
        match self {
            Self::AtLeast(min) => detection.len() >= *min,
            Self::Always => true,
        }
    }
}

/// One step of a strategy chain.
pub struct DetectionStep {
    pub detector: Box<dyn BoundaryDetector>,
    pub acceptance: Acceptance,
}

impl DetectionStep {
    #[must_use]
    pub fn new(detector: impl BoundaryDetector + 'static, acceptance: Acceptance) -> Self {
        Self {
            detector: Box::new(detector),
            acceptance,
        }
    }
}

/// Ordered list of detection steps.
#[derive(Default)]
pub struct StrategyChain {
    steps: Vec<DetectionStep>,
}

impl StrategyChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    #[must_use]
    pub fn then(mut self, detector: impl BoundaryDetector + 'static, acceptance: Acceptance) -> Self {
        self.steps.push(DetectionStep::new(detector, acceptance));
        self
    }

    /// Strategy names in evaluation order.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.detector.name()).collect()
    }

    /// Run the steps in order and return the first accepted detection.
    ///
    /// Returns `None` when no step is accepted.
    #[must_use]
    pub fn detect(&self, document: &SourceDocument) -> Option<Detection> {
        let main_text = document.main_text();

        for step in &self.steps {
            let detection = step.detector.detect(document, &main_text);
            if step.acceptance.accepts(&detection) {
                tracing::debug!(
                    strategy = detection.strategy,
                    boundaries = detection.len(),
                    "Strategy accepted"
                );
                return Some(detection);
            }
            tracing::debug!(
                strategy = detection.strategy,
                boundaries = detection.len(),
                acceptance = ?step.acceptance,
                "Strategy rejected, trying next"
            );
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detect_text(detector: &dyn BoundaryDetector, text: &str) -> Detection {
        let document = SourceDocument::parse("");
        detector.detect(&document, text)
    }

    fn numbers(detection: &Detection) -> Vec<&str> {
        detection.matches.iter().map(|m| m.number.as_str()).collect()
    }

    #[test]
    fn test_numeric_dot_finds_line_starts() {
        let text = "Titre préliminaire\n1. Le présent code régit.\n2. Toute personne.\n12.1. Ajouté.";
        let detection = detect_text(&PatternDetector::numeric_dot(), text);
        assert_eq!(numbers(&detection), vec!["1", "2", "12.1"]);

        let first = &detection.matches[0];
        assert_eq!(&text[first.marker_end..first.marker_end + 2], "Le");
    }

    #[test]
    fn test_numeric_dot_ignores_mid_line_numbers() {
        let text = "Voir l'article 5. Il prévoit\nsans numéro";
        let detection = detect_text(&PatternDetector::numeric_dot(), text);
        assert!(detection.is_empty());
    }

    #[test]
    fn test_numeric_dot_requires_period() {
        let detection = detect_text(&PatternDetector::numeric_dot(), "12 Définitions\n12.1 Portée");
        assert!(detection.is_empty());
    }

    #[test]
    fn test_word_marker_case_insensitive() {
        let text = "Article 1\nCorps de l'article\nARTICLE 2.1\nAutre corps\nArticle 3 suivi de texte";
        let detector = PatternDetector::word_marker("Article").unwrap();
        let detection = detect_text(&detector, text);
        assert_eq!(numbers(&detection), vec!["1", "2.1"]);

        let first = &detection.matches[0];
        assert!(text[first.marker_end..].trim_start().starts_with("Corps"));
    }

    #[test]
    fn test_heading_line_keeps_heading_in_body() {
        let text = "1 Short title\nThis Act may be cited as the Example Act.\n2.1 Définitions\nIn this Act";
        let detection = detect_text(&PatternDetector::heading_line(), text);
        assert_eq!(numbers(&detection), vec!["1", "2.1"]);

        let first = &detection.matches[0];
        assert!(text[first.marker_end..].starts_with("Short title"));
    }

    #[test]
    fn test_heading_line_requires_capital() {
        let detection = detect_text(&PatternDetector::heading_line(), "1 short\n2 (a) item");
        assert!(detection.is_empty());
    }

    #[test]
    fn test_heading_line_accepts_accented_capital() {
        let detection = detect_text(&PatternDetector::heading_line(), "3 Étendue de la loi");
        assert_eq!(numbers(&detection), vec!["3"]);
    }

    fn section_html(count: usize) -> String {
        let mut html = String::from("<main>");
        for n in 1..=count {
            html.push_str(&format!(
                r#"<div class="section" id="s-{n}"><p>{n}</p><p>Section {n} body text that is long enough to be kept as a provision body.</p></div>"#
            ));
        }
        html.push_str("</main>");
        html
    }

    #[test]
    fn test_section_element_detection() {
        let document = SourceDocument::parse(&section_html(3));
        let detector = SectionElementDetector::new(40, 60);
        let detection = detector.detect(&document, &document.main_text());

        assert_eq!(numbers(&detection), vec!["1", "2", "3"]);
        let second = &detection.matches[1];
        assert!(detection.text[second.marker_end..].starts_with("Section 2 body"));
    }

    #[test]
    fn test_section_element_suppresses_nested_duplicates() {
        let html = r#"<main>
            <section id="section-7"><div class="sectionBody"><p>7</p><p>Every person who commits an offence under this section is guilty.</p></div></section>
        </main>"#;
        let document = SourceDocument::parse(html);
        let detection = SectionElementDetector::new(40, 60).detect(&document, "");
        assert_eq!(numbers(&detection), vec!["7"]);
    }

    #[test]
    fn test_section_element_skips_short_and_unnumbered() {
        let html = r#"<main>
            <div class="section"><p>1</p><p>Too short</p></div>
            <div class="section"><p>Preamble without a number but with plenty of words in it.</p></div>
            <div class="other"><p>2</p><p>Not a section candidate even though the text is long enough.</p></div>
        </main>"#;
        let document = SourceDocument::parse(html);
        let detection = SectionElementDetector::new(40, 60).detect(&document, "");
        assert!(detection.is_empty());
    }

    #[test]
    fn test_chain_falls_through_to_next_step() {
        let chain = StrategyChain::new()
            .then(PatternDetector::numeric_dot(), Acceptance::AtLeast(1))
            .then(PatternDetector::word_marker("Article").unwrap(), Acceptance::AtLeast(1));
        let document = SourceDocument::parse("<main><p>Article 4</p><p>Texte de l'article.</p></main>");

        let detection = chain.detect(&document).unwrap();
        assert_eq!(detection.strategy, "word-marker");
        assert_eq!(numbers(&detection), vec!["4"]);
    }

    #[test]
    fn test_chain_without_accepted_step() {
        let chain = StrategyChain::new().then(PatternDetector::numeric_dot(), Acceptance::AtLeast(1));
        let document = SourceDocument::parse("<main><p>Rien</p></main>");
        assert!(chain.detect(&document).is_none());
    }

    #[test]
    fn test_acceptance_rules() {
        let empty = Detection {
            text: String::new(),
            matches: Vec::new(),
            strategy: "x",
        };
        assert!(Acceptance::Always.accepts(&empty));
        assert!(!Acceptance::AtLeast(1).accepts(&empty));
        assert!(Acceptance::AtLeast(0).accepts(&empty));
    }

    #[test]
    fn test_strategy_names_in_order() {
        let chain = StrategyChain::new()
            .then(SectionElementDetector::new(40, 60), Acceptance::AtLeast(20))
            .then(PatternDetector::heading_line(), Acceptance::Always);
        assert_eq!(chain.strategy_names(), vec!["section-element", "heading-line"]);
    }
}
