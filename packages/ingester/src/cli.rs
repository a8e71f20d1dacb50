//! Command-line interface for the ingester.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{validate_law_key, IngestOptions, SegmentationConfig};
use crate::error::Result;
use crate::http::{HttpFetcher, PageFetcher};
use crate::ingest::{run_ingestion_with_progress, IngestContext};
use crate::law_registry::YamlFileRegistry;
use crate::profile::create_default_profiles;
use crate::segment::{segment_document, SegmentOutcome};
use crate::sink::JsonFileStore;
use crate::types::{Jurisdiction, LawContext};

/// Statute Ingester - Segment LégisQuébec and Justice Laws pages into citable provisions.
#[derive(Parser)]
#[command(name = "statute-ingester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest every pending statute of a registry file.
    Ingest {
        /// Registry file (YAML list of statutes)
        #[arg(short, long)]
        registry: PathBuf,

        /// Record store file (JSON array, created if missing)
        #[arg(short, long)]
        store: PathBuf,

        /// Only ingest this law key (overrides ONLY_LAW_KEY)
        #[arg(long)]
        law_key: Option<String>,

        /// Only ingest this jurisdiction code, e.g. QC or CA-FED (overrides ONLY_JURISDICTION)
        #[arg(long)]
        jurisdiction: Option<String>,

        /// Log failing statutes and continue with the next one
        #[arg(long)]
        keep_going: bool,

        /// Delay between statutes in milliseconds (overrides INGEST_PACING_MS)
        #[arg(long)]
        pacing_ms: Option<u64>,
    },

    /// Segment a single page and print its provisions as JSON.
    Segment {
        /// Local HTML file, or an http(s) URL to fetch
        source: String,

        /// Canonical code id used in citations (e.g., CCQ, C-46)
        #[arg(long)]
        code_id: String,

        /// Jurisdiction code (QC or CA-FED)
        #[arg(short, long)]
        jurisdiction: String,

        /// Jurisdiction bucket (default: the jurisdiction code)
        #[arg(long)]
        bucket: Option<String>,

        /// Page URL of a local file, used to resolve full-text links
        #[arg(long)]
        url: Option<String>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            registry,
            store,
            law_key,
            jurisdiction,
            keep_going,
            pacing_ms,
        } => {
            let mut options = IngestOptions::from_env()?.with_keep_going(keep_going);
            if let Some(key) = law_key {
                validate_law_key(&key)?;
                options = options.with_law_key(key);
            }
            if let Some(code) = jurisdiction {
                options = options.with_jurisdiction(code);
            }
            if let Some(ms) = pacing_ms {
                options = options.with_pacing(Duration::from_millis(ms));
            }
            ingest_command(&registry, &store, &options)
        }
        Commands::Segment {
            source,
            code_id,
            jurisdiction,
            bucket,
            url,
        } => segment_command(&source, &code_id, &jurisdiction, bucket, url),
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Execute the ingest command.
fn ingest_command(registry_path: &Path, store_path: &Path, options: &IngestOptions) -> Result<()> {
    let profiles = create_default_profiles(&SegmentationConfig::from_env()?)?;
    let mut registry = YamlFileRegistry::open(registry_path)?;
    let mut store = JsonFileStore::open(store_path)?;
    let fetcher = HttpFetcher::new()?;

    println!(
        "{} {} into {}",
        style("Ingesting").bold(),
        style(registry_path.display()).cyan(),
        style(store_path.display()).green()
    );
    println!();

    let pb = spinner();
    let result = run_ingestion_with_progress(
        IngestContext {
            fetcher: &fetcher,
            registry: &mut registry,
            sink: &mut store,
        },
        &profiles,
        options,
        &mut |progress| {
            pb.set_message(format!(
                "[{}/{}] {}",
                progress.index + 1,
                progress.total,
                progress.row.law_key
            ));
        },
    );
    pb.finish_and_clear();
    let summary = result?;

    for law in &summary.ingested {
        println!(
            "  {} {} ({} provisions, {})",
            style("✓").green(),
            law.law_key,
            law.records,
            law.strategy
        );
    }
    for law_key in &summary.skipped {
        println!("  {} {} (skipped)", style("-").dim(), law_key);
    }
    for failed in &summary.failed {
        println!(
            "  {} {}: {}",
            style("✗").red().bold(),
            failed.law_key,
            failed.error
        );
    }

    println!();
    println!(
        "{} {} statutes, {} provisions",
        style("Ingested:").green().bold(),
        summary.ingested.len(),
        summary.records()
    );
    if !summary.failed.is_empty() {
        println!(
            "{} {}",
            style("Failed:").red().bold(),
            summary.failed.len()
        );
    }

    Ok(())
}

/// Execute the segment command.
fn segment_command(
    source: &str,
    code_id: &str,
    jurisdiction: &str,
    bucket: Option<String>,
    url: Option<String>,
) -> Result<()> {
    let profiles = create_default_profiles(&SegmentationConfig::from_env()?)?;
    let fetcher = HttpFetcher::new()?;

    let html = if source.starts_with("http://") || source.starts_with("https://") {
        fetcher.fetch(source)?
    } else {
        fs::read_to_string(source)?
    };
    let source_url = url.unwrap_or_else(|| source.to_string());

    let code = Jurisdiction::from_code(jurisdiction);
    let mut law = LawContext::new(code_id.to_lowercase(), code_id, code, source_url);
    if let Some(bucket) = bucket {
        law = law.with_bucket(bucket);
    } else if code == Jurisdiction::Other {
        law = law.with_bucket(jurisdiction);
    }

    match segment_document(&profiles, &law, html, &fetcher)? {
        SegmentOutcome::Segmented(document) => {
            eprintln!(
                "{} {} provisions from {} ({})",
                style("Segmented").green().bold(),
                document.records.len(),
                document.source_url,
                document.strategy
            );
            println!("{}", serde_json::to_string_pretty(&document.records)?);
        }
        SegmentOutcome::Unsupported(_) => {
            eprintln!(
                "{} no segmentation profile for jurisdiction {}",
                style("Skipped:").yellow().bold(),
                jurisdiction
            );
        }
    }

    Ok(())
}
