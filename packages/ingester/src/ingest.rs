//! Batch ingestion: registry rows in, provision records out.
//!
//! ```text
//! pending rows ──► pace ──► fetch ──► segment ──► upsert ──► mark ingested
//! ```
//!
//! The pacing delay only separates consecutive fetches; skipped rows never wait.
//!
//! Documents are processed one at a time. A failure halts the run unless
//! [`IngestOptions::keep_going`] is set, in which case it is recorded in the
//! summary and the registry row keeps its `to_ingest` status.

use std::thread;

use chrono::Utc;

use crate::config::IngestOptions;
use crate::error::Result;
use crate::http::PageFetcher;
use crate::law_registry::{LawRegistry, PendingFilter};
use crate::profile::ProfileRegistry;
use crate::segment::{segment_document, SegmentOutcome};
use crate::sink::{upsert_records, RecordSink};
use crate::types::{LawContext, RegistryRow};

/// Collaborators of a batch run, constructed once by the caller.
pub struct IngestContext<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub registry: &'a mut dyn LawRegistry,
    pub sink: &'a mut dyn RecordSink,
}

/// A statute stored during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedLaw {
    pub law_key: String,
    pub records: usize,
    pub strategy: &'static str,
    pub source_url: String,
}

/// A statute that failed while `keep_going` was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLaw {
    pub law_key: String,
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub ingested: Vec<IngestedLaw>,
    /// Law keys without source URL or with an unsupported jurisdiction.
    pub skipped: Vec<String>,
    pub failed: Vec<FailedLaw>,
}

impl IngestSummary {
    /// Total number of records written.
    #[must_use]
    pub fn records(&self) -> usize {
        self.ingested.iter().map(|l| l.records).sum()
    }
}

/// Progress notification emitted before each row is processed.
#[derive(Debug, Clone, Copy)]
pub struct IngestProgress<'r> {
    pub row: &'r RegistryRow,
    pub index: usize,
    pub total: usize,
}

/// Ingest every pending registry row.
///
/// # Errors
/// The first per-document failure when `keep_going` is off, or a registry
/// read failure.
pub fn run_ingestion(
    ctx: IngestContext<'_>,
    profiles: &ProfileRegistry,
    options: &IngestOptions,
) -> Result<IngestSummary> {
    run_ingestion_with_progress(ctx, profiles, options, &mut |_| {})
}

/// [`run_ingestion`] with a progress callback.
pub fn run_ingestion_with_progress(
    ctx: IngestContext<'_>,
    profiles: &ProfileRegistry,
    options: &IngestOptions,
    on_progress: &mut dyn FnMut(IngestProgress<'_>),
) -> Result<IngestSummary> {
    let IngestContext {
        fetcher,
        registry,
        sink,
    } = ctx;

    let rows = registry.pending(&PendingFilter::from_options(options))?;
    let total = rows.len();
    tracing::info!(pending = total, "Loaded registry");

    let mut summary = IngestSummary::default();
    let mut fetched = false;

    for (index, row) in rows.iter().enumerate() {
        on_progress(IngestProgress { row, index, total });

        let Some(law) = fetch_target(row, profiles) else {
            summary.skipped.push(row.law_key.clone());
            continue;
        };
        if fetched && !options.pacing.is_zero() {
            thread::sleep(options.pacing);
        }
        fetched = true;

        match ingest_law(row, law, fetcher, registry, sink, profiles, options) {
            Ok(Some(law)) => summary.ingested.push(law),
            Ok(None) => summary.skipped.push(row.law_key.clone()),
            Err(e) if options.keep_going => {
                tracing::error!(law_key = %row.law_key, error = %e, "Ingestion failed");
                summary.failed.push(FailedLaw {
                    law_key: row.law_key.clone(),
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        ingested = summary.ingested.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        records = summary.records(),
        "Ingestion finished"
    );
    Ok(summary)
}

/// The statute to fetch for a row, or `None` when the row is skipped.
fn fetch_target(row: &RegistryRow, profiles: &ProfileRegistry) -> Option<LawContext> {
    let Some(law) = row.to_context() else {
        tracing::warn!(law_key = %row.law_key, "No source URL, skipping");
        return None;
    };

    if !profiles.supports(law.jurisdiction) {
        log_unsupported(row);
        return None;
    }
    Some(law)
}

/// Fetch, segment and store one statute. `Ok(None)` means it was skipped.
fn ingest_law(
    row: &RegistryRow,
    law: LawContext,
    fetcher: &dyn PageFetcher,
    registry: &mut dyn LawRegistry,
    sink: &mut dyn RecordSink,
    profiles: &ProfileRegistry,
    options: &IngestOptions,
) -> Result<Option<IngestedLaw>> {
    tracing::info!(law_key = %law.law_key, url = %law.source_url, "FETCH");
    let html = fetcher.fetch(&law.source_url)?;

    let document = match segment_document(profiles, &law, html, fetcher)? {
        SegmentOutcome::Segmented(document) => document,
        SegmentOutcome::Unsupported(_) => {
            log_unsupported(row);
            return Ok(None);
        }
    };
    tracing::info!(law_key = %law.law_key, provisions = document.records.len(), "PARSE");

    let written = upsert_records(sink, document.records, options.batch_size)?;
    tracing::info!(law_key = %law.law_key, records = written, "UPSERT");

    registry.mark_ingested(&law.law_key, Utc::now())?;
    tracing::info!(
        law_key = %law.law_key,
        code_id = %law.code_id,
        jurisdiction = %law.jurisdiction,
        records = written,
        "DONE"
    );

    Ok(Some(IngestedLaw {
        law_key: law.law_key,
        records: written,
        strategy: document.strategy,
        source_url: document.source_url,
    }))
}

fn log_unsupported(row: &RegistryRow) {
    tracing::warn!(
        law_key = %row.law_key,
        jurisdiction = row.jurisdiction_code(),
        "Unsupported jurisdiction, skipping"
    );
}
