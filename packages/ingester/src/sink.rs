//! Record sink: where provision records end up.
//!
//! Every sink upserts on `(code_id, jurisdiction, citation)`, so re-running
//! the pipeline after a partial failure never duplicates records.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dedupe::dedupe_records;
use crate::error::{IngesterError, Result};
use crate::files::write_atomic;
use crate::types::{ProvisionRecord, RecordKey};

/// Number of citations reported when a batch fails.
const FAILED_BATCH_SAMPLE: usize = 5;

/// Destination of provision records.
pub trait RecordSink {
    /// Insert or replace every record of `batch` by conflict key.
    fn upsert(&mut self, batch: &[ProvisionRecord]) -> Result<()>;
}

/// Deduplicate `records` and upsert them in batches of `batch_size`.
///
/// A failing batch aborts the call with [`IngesterError::Upsert`], carrying
/// the batch offset and a sample of its citations. Batches before it stay
/// committed.
///
/// # Returns
/// Number of records written.
pub fn upsert_records(
    sink: &mut dyn RecordSink,
    records: Vec<ProvisionRecord>,
    batch_size: usize,
) -> Result<usize> {
    let records = dedupe_records(records);
    let batch_size = batch_size.max(1);

    for (batch_index, batch) in records.chunks(batch_size).enumerate() {
        let offset = batch_index * batch_size;
        sink.upsert(batch).map_err(|e| IngesterError::Upsert {
            offset,
            sample: batch
                .iter()
                .take(FAILED_BATCH_SAMPLE)
                .map(|r| r.citation.clone())
                .collect(),
            message: e.to_string(),
        })?;
        tracing::debug!(offset, size = batch.len(), "Upserted batch");
    }

    Ok(records.len())
}

/// In-memory sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: BTreeMap<RecordKey, ProvisionRecord>,
    batches: usize,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored records ordered by key.
    pub fn records(&self) -> impl Iterator<Item = &ProvisionRecord> {
        self.rows.values()
    }

    #[must_use]
    pub fn get(&self, key: &RecordKey) -> Option<&ProvisionRecord> {
        self.rows.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of upsert calls received.
    #[must_use]
    pub fn batches(&self) -> usize {
        self.batches
    }
}

impl RecordSink for MemorySink {
    fn upsert(&mut self, batch: &[ProvisionRecord]) -> Result<()> {
        for record in batch {
            self.rows.insert(record.key(), record.clone());
        }
        self.batches += 1;
        Ok(())
    }
}

/// Record store persisted as a JSON array.
///
/// The file is rewritten after every batch.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    rows: BTreeMap<RecordKey, ProvisionRecord>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut rows = BTreeMap::new();

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            if !content.trim().is_empty() {
                let records: Vec<ProvisionRecord> = serde_json::from_str(&content)?;
                for record in records {
                    rows.insert(record.key(), record);
                }
            }
        }

        Ok(Self { path, rows })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &ProvisionRecord> {
        self.rows.values()
    }

    fn save(&self) -> Result<()> {
        let records: Vec<&ProvisionRecord> = self.rows.values().collect();
        let content = serde_json::to_string_pretty(&records)?;
        write_atomic(&self.path, &content)
    }
}

impl RecordSink for JsonFileStore {
    fn upsert(&mut self, batch: &[ProvisionRecord]) -> Result<()> {
        for record in batch {
            self.rows.insert(record.key(), record.clone());
        }
        self.save()
    }
}
