//! Statute Ingester - Segment Québec and federal Canadian statutes into
//! citable provisions.
//!
//! This crate fetches statute pages from LégisQuébec and the federal Justice
//! Laws website, splits each page into one record per article or section
//! and upserts the records into a record store keyed by citation.
//!
//! # Example
//!
//! ```
//! use statute_ingester::config::SegmentationConfig;
//! use statute_ingester::profile::create_default_profiles;
//! use statute_ingester::segment::segment_html;
//! use statute_ingester::types::{Jurisdiction, LawContext};
//!
//! let profiles = create_default_profiles(&SegmentationConfig::default()).unwrap();
//! let profile = profiles.get(Jurisdiction::Quebec).unwrap();
//! let law = LawContext::new("ccq", "CCQ", Jurisdiction::Quebec, "https://www.legisquebec.gouv.qc.ca/fr/document/lc/CCQ-1991");
//!
//! let html = "<main><p>1. Toute personne est titulaire de droits de la personnalité, tels le droit à la vie.</p></main>";
//! let (records, strategy) = segment_html(profile, &law, html);
//! assert_eq!(records[0].citation, "art. 1 CCQ");
//! assert_eq!(strategy, Some("numeric-dot"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, thresholds and run options
//! - [`types`]: Core data types (ProvisionRecord, RegistryRow, Jurisdiction, etc.)
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client and the `PageFetcher` seam
//! - [`normalize`]: Parsed pages and text normalization
//! - [`boundary`]: Boundary detectors and the strategy chain
//! - [`extract`]: Chunk extraction and citation synthesis
//! - [`resolve`]: Full-text link resolution for landing pages
//! - [`dedupe`]: Deduplication by conflict key
//! - [`profile`]: Jurisdiction profiles and their registry
//! - [`segment`]: Per-document dispatch
//! - [`sink`]: Record sinks and batched upserts
//! - [`law_registry`]: Registry of statutes to ingest
//! - [`ingest`]: Batch runner
//! - [`cli`]: Command-line interface

pub mod boundary;
pub mod cli;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod extract;
pub mod files;
pub mod http;
pub mod ingest;
pub mod law_registry;
pub mod normalize;
pub mod profile;
pub mod resolve;
pub mod segment;
pub mod sink;
pub mod types;

// Re-export main functions
pub use ingest::{run_ingestion, IngestContext, IngestSummary};
pub use segment::{segment_document, segment_html, SegmentOutcome};

// Re-export commonly used items
pub use config::{validate_law_key, IngestOptions, SegmentationConfig};
pub use error::{IngesterError, Result};
pub use types::{Jurisdiction, LawContext, ProvisionRecord, RegistryRow};
