//! Slicing provisions out of a detection and building provision records.

use std::ops::Range;

use crate::boundary::{BoundaryMatch, Detection};
use crate::types::{LawContext, ProvisionRecord};

/// Byte spans of the chunks delimited by `matches`.
///
/// Chunk `i` runs from match `i` to match `i + 1`, the last one to
/// `text_len`. Together they tile the text from the first match to the end.
///
/// # Examples
/// ```
/// use statute_ingester::boundary::BoundaryMatch;
/// use statute_ingester::extract::chunk_spans;
///
/// let at = |position| BoundaryMatch {
///     position,
///     marker_end: position + 3,
///     number: "1".to_string(),
///     strategy: "numeric-dot",
/// };
/// assert_eq!(chunk_spans(&[at(0), at(10)], 25), vec![0..10, 10..25]);
/// ```
#[must_use]
pub fn chunk_spans(matches: &[BoundaryMatch], text_len: usize) -> Vec<Range<usize>> {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = matches.get(i + 1).map_or(text_len, |next| next.position);
            m.position..end.max(m.position)
        })
        .collect()
}

/// Build a citation such as `art. 12 CPC` or `s. 2.1 C-46`.
#[must_use]
pub fn format_citation(marker: &str, number: &str, code_id: &str) -> String {
    format!("{marker} {number} {code_id}")
}

/// Turn a detection into provision records.
///
/// The leading number or marker token is stripped from every chunk; chunks
/// whose remaining body is shorter than `min_body_chars` characters are
/// dropped as noise. Records are not deduplicated here.
#[must_use]
pub fn extract_provisions(
    detection: &Detection,
    law: &LawContext,
    citation_marker: &str,
    min_body_chars: usize,
) -> Vec<ProvisionRecord> {
    let spans = chunk_spans(&detection.matches, detection.text.len());
    let mut records = Vec::with_capacity(spans.len());
    let mut dropped = 0usize;

    for (boundary, span) in detection.matches.iter().zip(spans) {
        let body_start = boundary.marker_end.clamp(span.start, span.end);
        let body = detection.text[body_start..span.end].trim();

        if body.chars().count() < min_body_chars {
            dropped += 1;
            continue;
        }

        records.push(ProvisionRecord {
            code_id: law.code_id.clone(),
            jurisdiction: law.jurisdiction,
            jurisdiction_bucket: law.jurisdiction_bucket.clone(),
            citation: format_citation(citation_marker, &boundary.number, &law.code_id),
            title: None,
            text: body.to_string(),
        });
    }

    if dropped > 0 {
        tracing::debug!(
            law_key = %law.law_key,
            dropped,
            min_body_chars,
            "Dropped short chunks"
        );
    }

    records
}
