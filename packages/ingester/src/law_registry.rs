//! Law registry: the list of statutes to ingest and their status.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::IngestOptions;
use crate::error::{IngesterError, Result};
use crate::files::write_atomic;
use crate::types::{LawStatus, RegistryRow};

/// Row selection applied by [`LawRegistry::pending`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingFilter {
    /// Only the row with this law key.
    pub law_key: Option<String>,

    /// Only rows with this jurisdiction code (case-insensitive).
    pub jurisdiction: Option<String>,
}

impl PendingFilter {
    /// Build the filter of a batch run.
    #[must_use]
    pub fn from_options(options: &IngestOptions) -> Self {
        Self {
            law_key: options.only_law_key.clone(),
            jurisdiction: options.only_jurisdiction.clone(),
        }
    }

    /// Check if a row is pending and passes the filter.
    #[must_use]
    pub fn matches(&self, row: &RegistryRow) -> bool {
        if row.status != LawStatus::ToIngest {
            return false;
        }
        if let Some(key) = self.law_key.as_deref() {
            if row.law_key != key {
                return false;
            }
        }
        if let Some(code) = self.jurisdiction.as_deref() {
            if !row.jurisdiction_code().eq_ignore_ascii_case(code.trim()) {
                return false;
            }
        }
        true
    }
}

/// Source of statutes to ingest.
pub trait LawRegistry {
    /// Rows with status `to_ingest` that pass `filter`, in registry order.
    fn pending(&self, filter: &PendingFilter) -> Result<Vec<RegistryRow>>;

    /// Set a row's status to `ingested` and stamp `last_ingested_at`.
    fn mark_ingested(&mut self, law_key: &str, at: DateTime<Utc>) -> Result<()>;
}

fn mark_row(rows: &mut [RegistryRow], law_key: &str, at: DateTime<Utc>) -> Result<()> {
    let row = rows
        .iter_mut()
        .find(|r| r.law_key == law_key)
        .ok_or_else(|| IngesterError::Registry(format!("unknown law key '{law_key}'")))?;
    row.status = LawStatus::Ingested;
    row.last_ingested_at = Some(at);
    Ok(())
}

/// In-memory registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    rows: Vec<RegistryRow>,
}

impl MemoryRegistry {
    #[must_use]
    pub fn new(rows: Vec<RegistryRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[RegistryRow] {
        &self.rows
    }

    #[must_use]
    pub fn get(&self, law_key: &str) -> Option<&RegistryRow> {
        self.rows.iter().find(|r| r.law_key == law_key)
    }
}

impl LawRegistry for MemoryRegistry {
    fn pending(&self, filter: &PendingFilter) -> Result<Vec<RegistryRow>> {
        Ok(self.rows.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    fn mark_ingested(&mut self, law_key: &str, at: DateTime<Utc>) -> Result<()> {
        mark_row(&mut self.rows, law_key, at)
    }
}

/// Registry persisted as a YAML list of rows.
///
/// ```yaml
/// - law_key: cpc_qc
///   canonical_code_id: CPC
///   jurisdiction: QC
///   source_url: https://www.legisquebec.gouv.qc.ca/fr/document/lc/C-25.01
///   status: to_ingest
/// ```
#[derive(Debug)]
pub struct YamlFileRegistry {
    path: PathBuf,
    rows: Vec<RegistryRow>,
}

impl YamlFileRegistry {
    /// Load the registry file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        let rows: Vec<RegistryRow> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_yaml_ng::from_str(&content)?
        };
        Ok(Self { path, rows })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn rows(&self) -> &[RegistryRow] {
        &self.rows
    }

    fn save(&self) -> Result<()> {
        let content = serde_yaml_ng::to_string(&self.rows)?;
        write_atomic(&self.path, &content)
    }
}

impl LawRegistry for YamlFileRegistry {
    fn pending(&self, filter: &PendingFilter) -> Result<Vec<RegistryRow>> {
        Ok(self.rows.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    fn mark_ingested(&mut self, law_key: &str, at: DateTime<Utc>) -> Result<()> {
        mark_row(&mut self.rows, law_key, at)?;
        self.save()
    }
}
