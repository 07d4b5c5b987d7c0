//! Error ledger: quarantined per-motion failures
//!
//! Rows are `(voting_id, url, message)`. A row with an empty url refers to
//! the voting as a whole. On every write the rows are sorted by
//! `(voting_id, url)` and exact duplicates are removed.

use crate::state::{replace_file, LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One quarantined failure
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub voting_id: String,
    pub url: Option<String>,
    pub message: String,
}

/// Persistent quarantine ledger backed by a CSV file
#[derive(Debug)]
pub struct ErrorStore {
    path: PathBuf,
    entries: Vec<ErrorEntry>,
}

impl ErrorStore {
    /// Loads the ledger, starting empty if the file does not exist yet
    pub fn load(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            read_entries(&path)?
        } else {
            Vec::new()
        };

        tracing::debug!(
            "Loaded {} quarantined failures from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any row is recorded for this voting
    pub fn has_unresolved(&self, voting_id: &str) -> bool {
        self.entries.iter().any(|e| e.voting_id == voting_id)
    }

    /// Ids of all votings with at least one row
    pub fn unresolved_ids(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.voting_id.as_str()).collect()
    }

    /// Records a failure and rewrites the ledger
    pub fn add(
        &mut self,
        voting_id: &str,
        url: Option<&str>,
        message: impl Into<String>,
    ) -> LedgerResult<()> {
        self.entries.push(ErrorEntry {
            voting_id: voting_id.to_string(),
            url: url.map(str::to_string),
            message: message.into(),
        });
        self.save()
    }

    /// Removes every row of a voting (the voting is fully healed)
    pub fn remove_all(&mut self, voting_id: &str) -> LedgerResult<()> {
        self.remove_where(|e| e.voting_id == voting_id)
    }

    /// Removes the rows of one nested item, leaving its siblings in place
    pub fn remove_url(&mut self, voting_id: &str, url: &str) -> LedgerResult<()> {
        self.remove_where(|e| e.voting_id == voting_id && e.url.as_deref() == Some(url))
    }

    fn remove_where(&mut self, matches: impl Fn(&ErrorEntry) -> bool) -> LedgerResult<()> {
        let before = self.entries.len();
        self.entries.retain(|e| !matches(e));
        if self.entries.len() == before {
            return Ok(());
        }
        self.save()
    }

    /// Sorts, deduplicates and rewrites the whole file
    pub fn save(&mut self) -> LedgerResult<()> {
        self.entries.sort();
        self.entries.dedup();

        let csv_error = |source| LedgerError::Csv {
            path: self.path.clone(),
            source,
        };

        // Header is written by hand so an empty ledger still has one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(["voting_id", "url", "message"])
            .map_err(csv_error)?;
        for entry in &self.entries {
            writer.serialize(entry).map_err(csv_error)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| LedgerError::io(&self.path, e.into_error()))?;

        replace_file(&self.path, &bytes)
    }
}

fn read_entries(path: &Path) -> LedgerResult<Vec<ErrorEntry>> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| LedgerError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    reader
        .deserialize()
        .collect::<Result<Vec<ErrorEntry>, _>>()
        .map_err(|source| LedgerError::Csv {
            path: path.to_path_buf(),
            source,
        })
}
