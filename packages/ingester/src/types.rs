//! Core data types for the ingester.
//!
//! These types describe statutes as the registry knows them and the provision
//! records handed to the record store.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Jurisdiction codes understood by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Jurisdiction {
    /// Québec (LégisQuébec).
    #[serde(rename = "QC")]
    Quebec,

    /// Canada, federal statutes (Justice Laws).
    #[serde(rename = "CA-FED")]
    Federal,

    /// Canada, unspecified level.
    #[serde(rename = "CA")]
    Canada,

    /// Anything else.
    #[serde(rename = "OTHER")]
    Other,
}

impl Jurisdiction {
    /// Get the wire code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quebec => "QC",
            Self::Federal => "CA-FED",
            Self::Canada => "CA",
            Self::Other => "OTHER",
        }
    }

    /// Parse a registry jurisdiction code.
    ///
    /// Matching is case-insensitive; unknown codes map to [`Jurisdiction::Other`].
    ///
    /// # Examples
    /// ```
    /// use statute_ingester::types::Jurisdiction;
    ///
    /// assert_eq!(Jurisdiction::from_code("ca-fed"), Jurisdiction::Federal);
    /// assert_eq!(Jurisdiction::from_code("ON"), Jurisdiction::Other);
    /// ```
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "QC" => Self::Quebec,
            "CA-FED" => Self::Federal,
            "CA" => Self::Canada,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the statute being segmented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawContext {
    /// Registry key (e.g., "cpc_qc").
    pub law_key: String,

    /// Canonical code id used in citations (e.g., "CPC").
    pub code_id: String,

    /// Jurisdiction of the statute.
    pub jurisdiction: Jurisdiction,

    /// Coarse grouping label for downstream filtering.
    pub jurisdiction_bucket: String,

    /// Page the statute is published at.
    pub source_url: String,
}

impl LawContext {
    /// Create a context whose bucket defaults to the jurisdiction code.
    #[must_use]
    pub fn new(
        law_key: impl Into<String>,
        code_id: impl Into<String>,
        jurisdiction: Jurisdiction,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            law_key: law_key.into(),
            code_id: code_id.into(),
            jurisdiction,
            jurisdiction_bucket: jurisdiction.as_str().to_string(),
            source_url: source_url.into(),
        }
    }

    /// Set the jurisdiction bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.jurisdiction_bucket = bucket.into();
        self
    }
}

/// A single citable provision, as stored in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRecord {
    pub code_id: String,
    pub jurisdiction: Jurisdiction,
    pub jurisdiction_bucket: String,
    /// Synthesized citation, e.g. "art. 12 CPC" or "s. 2.1 C-46".
    pub citation: String,
    /// Reserved; always `None` for now.
    pub title: Option<String>,
    pub text: String,
}

impl ProvisionRecord {
    /// Conflict key used by the deduplicator and the record store.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey {
            code_id: self.code_id.clone(),
            jurisdiction: self.jurisdiction,
            citation: self.citation.clone(),
        }
    }

    /// Length of the text in characters.
    #[must_use]
    pub fn text_chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// Upsert conflict key: `(code_id, jurisdiction, citation)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub code_id: String,
    pub jurisdiction: Jurisdiction,
    pub citation: String,
}

/// Ingestion status of a registry row.
///
/// Statuses this tool does not manage are kept verbatim, so rewriting the
/// registry never alters rows it did not touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LawStatus {
    /// Waiting for the next ingestion run.
    ToIngest,
    /// Successfully segmented and stored.
    Ingested,
    /// Any other status, e.g. `archived`.
    Other(String),
}

impl LawStatus {
    /// Get the registry spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ToIngest => "to_ingest",
            Self::Ingested => "ingested",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for LawStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "to_ingest" => Self::ToIngest,
            "ingested" => Self::Ingested,
            _ => Self::Other(raw),
        }
    }
}

impl From<LawStatus> for String {
    fn from(status: LawStatus) -> Self {
        match status {
            LawStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// A statute entry of the law registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRow {
    pub law_key: String,
    pub canonical_code_id: String,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub jurisdiction_bucket: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    pub status: LawStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ingested_at: Option<DateTime<Utc>>,
    /// Columns this tool does not read, carried through rewrites.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml_ng::Value>,
}

impl RegistryRow {
    /// Jurisdiction code of the row; rows without one are Québec statutes.
    #[must_use]
    pub fn jurisdiction_code(&self) -> &str {
        self.jurisdiction
            .as_deref()
            .filter(|j| !j.trim().is_empty())
            .unwrap_or("QC")
    }

    /// Build the segmentation context for this row.
    ///
    /// Returns `None` when the row has no source URL.
    #[must_use]
    pub fn to_context(&self) -> Option<LawContext> {
        let source_url = self.source_url.as_deref().filter(|u| !u.trim().is_empty())?;
        let code = self.jurisdiction_code();
        let bucket = self
            .jurisdiction_bucket
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(code);

        Some(
            LawContext::new(
                &self.law_key,
                &self.canonical_code_id,
                Jurisdiction::from_code(code),
                source_url.trim(),
            )
            .with_bucket(bucket),
        )
    }
}
