//! Configuration constants, tunable thresholds and validation functions.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{IngesterError, Result};

/// HTTP timeout in seconds.
///
/// Justice Laws full-text pages of large acts (Criminal Code, Income Tax Act)
/// are several megabytes and slow to render server side.
pub const HTTP_TIMEOUT_SECS: u64 = 90;

/// Language preference sent with every request.
pub const ACCEPT_LANGUAGE: &str = "fr-CA,fr;q=0.9,en;q=0.7";

/// Delay between two documents of a batch, in milliseconds.
pub const PACING_DELAY_MS: u64 = 500;

/// Number of records sent to the sink per upsert call.
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Minimum body length (characters) for a chunk to become a provision.
///
/// Shorter chunks are stray headings, empty anchors or table-of-contents
/// entries.
pub const MIN_BODY_CHARS: usize = 60;

/// Minimum number of accepted section elements before the federal DOM
/// strategy is trusted over the text fallback.
pub const FEDERAL_MIN_SECTIONS: usize = 20;

/// Minimum text length (characters) of a section element candidate.
pub const MIN_CANDIDATE_CHARS: usize = 40;

/// Length (characters) of the normalized-text snippet attached to zero-record errors.
pub const SNIPPET_CHARS: usize = 500;

/// Law key pattern: lowercase slug such as `cpc_qc` or `criminal-code`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LAW_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_\-]+$").expect("valid regex"));

/// Validate a registry law key.
///
/// # Examples
/// ```
/// use statute_ingester::config::validate_law_key;
///
/// assert!(validate_law_key("cpc_qc").is_ok());
/// assert!(validate_law_key("Code civil").is_err());
/// ```
pub fn validate_law_key(law_key: &str) -> Result<()> {
    if LAW_KEY_PATTERN.is_match(law_key) {
        Ok(())
    } else {
        Err(IngesterError::InvalidLawKey(law_key.to_string()))
    }
}

/// Empirical thresholds used by the segmentation engine.
///
/// None of these values has a documented rationale; they were tuned against
/// the live publishing sites and are kept adjustable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentationConfig {
    /// Minimum provision body length in characters.
    pub min_body_chars: usize,

    /// Accepted-candidate count required by the federal DOM strategy.
    pub federal_min_sections: usize,

    /// Minimum text length of a DOM section candidate.
    pub min_candidate_chars: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_body_chars: MIN_BODY_CHARS,
            federal_min_sections: FEDERAL_MIN_SECTIONS,
            min_candidate_chars: MIN_CANDIDATE_CHARS,
        }
    }
}

impl SegmentationConfig {
    /// Read overrides from `INGEST_MIN_BODY_CHARS`, `INGEST_FEDERAL_MIN_SECTIONS`
    /// and `INGEST_MIN_CANDIDATE_CHARS`, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            min_body_chars: env_parse("INGEST_MIN_BODY_CHARS")?.unwrap_or(defaults.min_body_chars),
            federal_min_sections: env_parse("INGEST_FEDERAL_MIN_SECTIONS")?
                .unwrap_or(defaults.federal_min_sections),
            min_candidate_chars: env_parse("INGEST_MIN_CANDIDATE_CHARS")?
                .unwrap_or(defaults.min_candidate_chars),
        })
    }

    #[must_use]
    pub fn with_min_body_chars(mut self, min_body_chars: usize) -> Self {
        self.min_body_chars = min_body_chars;
        self
    }

    #[must_use]
    pub fn with_federal_min_sections(mut self, federal_min_sections: usize) -> Self {
        self.federal_min_sections = federal_min_sections;
        self
    }

    #[must_use]
    pub fn with_min_candidate_chars(mut self, min_candidate_chars: usize) -> Self {
        self.min_candidate_chars = min_candidate_chars;
        self
    }
}

/// Options for a batch ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Only ingest the registry row with this law key.
    pub only_law_key: Option<String>,

    /// Only ingest rows of this jurisdiction code.
    pub only_jurisdiction: Option<String>,

    /// Politeness delay between documents.
    pub pacing: Duration,

    /// Records per sink upsert call.
    pub batch_size: usize,

    /// Log failing documents and continue instead of halting the batch.
    pub keep_going: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            only_law_key: None,
            only_jurisdiction: None,
            pacing: Duration::from_millis(PACING_DELAY_MS),
            batch_size: UPSERT_BATCH_SIZE,
            keep_going: false,
        }
    }
}

impl IngestOptions {
    /// Read `ONLY_LAW_KEY`, `ONLY_JURISDICTION` and `INGEST_PACING_MS`.
    pub fn from_env() -> Result<Self> {
        let only_law_key = env_string("ONLY_LAW_KEY");
        if let Some(key) = only_law_key.as_deref() {
            validate_law_key(key)?;
        }

        let pacing_ms = env_parse("INGEST_PACING_MS")?.unwrap_or(PACING_DELAY_MS);

        Ok(Self {
            only_law_key,
            only_jurisdiction: env_string("ONLY_JURISDICTION"),
            pacing: Duration::from_millis(pacing_ms),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_law_key(mut self, law_key: impl Into<String>) -> Self {
        self.only_law_key = Some(law_key.into());
        self
    }

    #[must_use]
    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.only_jurisdiction = Some(jurisdiction.into());
        self
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env_string(key) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| IngesterError::Config(format!("{key} must be a non-negative integer, got '{raw}'"))),
        None => Ok(None),
    }
}
