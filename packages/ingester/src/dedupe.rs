//! Deduplication of provision records per conflict key.

use std::collections::HashMap;

use crate::types::{ProvisionRecord, RecordKey};

/// Collapse records sharing `(code_id, jurisdiction, citation)`.
///
/// Per key the record with the longest text (in characters) wins; on a tie
/// the one seen first stays. The output keeps the order in which each key
/// first appeared.
#[must_use]
pub fn dedupe_records(records: Vec<ProvisionRecord>) -> Vec<ProvisionRecord> {
    let mut index: HashMap<RecordKey, usize> = HashMap::with_capacity(records.len());
    let mut best: Vec<ProvisionRecord> = Vec::with_capacity(records.len());

    for record in records {
        match index.get(&record.key()) {
            Some(&slot) => {
                if record.text_chars() > best[slot].text_chars() {
                    best[slot] = record;
                }
            }
            None => {
                index.insert(record.key(), best.len());
                best.push(record);
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Jurisdiction;
    use pretty_assertions::assert_eq;

    fn record(citation: &str, text: &str) -> ProvisionRecord {
        ProvisionRecord {
            code_id: "C-46".to_string(),
            jurisdiction: Jurisdiction::Federal,
            jurisdiction_bucket: "CA".to_string(),
            citation: citation.to_string(),
            title: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_longer_text_wins_in_any_order() {
        let short = record("s. 1 C-46", "short body");
        let long = record("s. 1 C-46", "a considerably longer body");

        let forward = dedupe_records(vec![short.clone(), long.clone()]);
        let backward = dedupe_records(vec![long.clone(), short]);

        assert_eq!(forward, vec![long.clone()]);
        assert_eq!(backward, vec![long]);
    }

    #[test]
    fn test_tie_keeps_first() {
        let first = record("s. 2 C-46", "same size A");
        let second = record("s. 2 C-46", "same size B");
        assert_eq!(dedupe_records(vec![first.clone(), second]), vec![first]);
    }

    #[test]
    fn test_distinct_keys_keep_first_seen_order() {
        let records = vec![
            record("s. 3 C-46", "three"),
            record("s. 1 C-46", "one"),
            record("s. 3 C-46", "three, longer"),
            record("s. 2 C-46", "two"),
        ];
        let citations: Vec<_> = dedupe_records(records)
            .into_iter()
            .map(|r| (r.citation, r.text))
            .collect();
        assert_eq!(
            citations,
            vec![
                ("s. 3 C-46".to_string(), "three, longer".to_string()),
                ("s. 1 C-46".to_string(), "one".to_string()),
                ("s. 2 C-46".to_string(), "two".to_string()),
            ]
        );
    }

    #[test]
    fn test_key_includes_code_and_jurisdiction() {
        let mut other_code = record("s. 1 C-46", "body");
        other_code.code_id = "C-45".to_string();
        let mut other_jurisdiction = record("s. 1 C-46", "body");
        other_jurisdiction.jurisdiction = Jurisdiction::Canada;

        let out = dedupe_records(vec![record("s. 1 C-46", "body"), other_code, other_jurisdiction]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_length_measured_in_characters() {
        let accented = record("s. 4 C-46", "éééé");
        let ascii = record("s. 4 C-46", "abcde");
        assert_eq!(dedupe_records(vec![accented, ascii.clone()]), vec![ascii]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let records = vec![
            record("s. 1 C-46", "one"),
            record("s. 1 C-46", "one but longer"),
            record("s. 2 C-46", "two"),
        ];
        let once = dedupe_records(records);
        assert_eq!(dedupe_records(once.clone()), once);
    }
}
