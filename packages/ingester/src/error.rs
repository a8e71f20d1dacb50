//! Error types for the ingester.
//!
//! `IngesterError` covers the whole pipeline. An unsupported jurisdiction is
//! a skip, not an error: see [`crate::segment::SegmentOutcome::Unsupported`].

use thiserror::Error;

/// Main error type for the ingester library.
#[derive(Debug, Error)]
pub enum IngesterError {
    /// Network failure or timeout while fetching a page.
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Building the HTTP client failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Segmentation produced no provision at all for a document.
    ///
    /// Usually means the publisher changed its markup.
    #[error("Parsed 0 provisions for {law_key} ({code_id}) [{jurisdiction}]. Snippet: {snippet}")]
    ZeroRecords {
        law_key: String,
        code_id: String,
        jurisdiction: String,
        snippet: String,
    },

    /// A sink batch failed. Batches before `offset` are already committed.
    #[error("Upsert failed on batch starting at {offset}. Sample citations={sample:?}: {message}")]
    Upsert {
        offset: usize,
        sample: Vec<String>,
        message: String,
    },

    /// Registry read or write failed.
    #[error("Registry error: {0}")]
    Registry(String),

    /// Invalid law key.
    #[error("Invalid law key: '{0}'. Expected lowercase letters, digits, '_' or '-' (e.g., cpc_qc)")]
    InvalidLawKey(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A URL could not be parsed.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for ingester operations.
pub type Result<T> = std::result::Result<T, IngesterError>;
