//! Progress ledger: votings already fully resolved
//!
//! Stored as a JSON object mapping each date-key to the ids completed on
//! that date. Loading consults the error ledger so that a voting with open
//! failures is never treated as done, even if a crash left it marked.

use crate::state::{replace_file, ErrorStore, LedgerError, LedgerResult};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Persistent map of date-key to completed voting ids
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    completed: BTreeMap<String, BTreeSet<String>>,
}

impl ProgressStore {
    /// Loads the ledger and drops every id that still has quarantined failures
    pub fn load(path: impl Into<PathBuf>, errors: &ErrorStore) -> LedgerResult<Self> {
        let path = path.into();
        let mut completed: BTreeMap<String, BTreeSet<String>> = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|e| LedgerError::io(&path, e))?;
            serde_json::from_str(&text).map_err(|source| LedgerError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };

        let unresolved = errors.unresolved_ids();
        let mut healed = 0;
        for ids in completed.values_mut() {
            let before = ids.len();
            ids.retain(|id| !unresolved.contains(id.as_str()));
            healed += before - ids.len();
        }
        if healed > 0 {
            tracing::info!(
                "Dropped {} completed entries that still have quarantined failures",
                healed
            );
        }

        Ok(Self { path, completed })
    }

    /// Reconstructs the ledger from an output tree and writes it
    ///
    /// Every immediate subdirectory of a date directory counts as completed.
    /// The error ledger is deliberately not consulted here.
    pub fn rebuild(path: impl Into<PathBuf>, data_dir: &Path) -> LedgerResult<Self> {
        let mut completed = BTreeMap::new();

        for date_dir in subdirectories(data_dir)? {
            let Some(date_key) = dir_name(&date_dir) else {
                continue;
            };
            let ids: BTreeSet<String> = subdirectories(&date_dir)?
                .iter()
                .filter_map(|p| dir_name(p))
                .collect();
            completed.insert(date_key, ids);
        }

        let mut store = Self {
            path: path.into(),
            completed,
        };
        store.save()?;
        tracing::info!(
            "Rebuilt progress ledger from {}: {} dates, {} votings",
            data_dir.display(),
            store.completed.len(),
            store.len()
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of completed votings over all dates
    pub fn len(&self) -> usize {
        self.completed.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Completed ids per date-key
    pub fn dates(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.completed
    }

    pub fn is_complete(&self, date_key: &str, id: &str) -> bool {
        self.completed
            .get(date_key)
            .is_some_and(|ids| ids.contains(id))
    }

    /// Marks a voting complete and rewrites the ledger
    pub fn mark_complete(&mut self, date_key: &str, id: &str) -> LedgerResult<()> {
        let inserted = self
            .completed
            .entry(date_key.to_string())
            .or_default()
            .insert(id.to_string());
        if inserted {
            self.save()?;
        }
        Ok(())
    }

    /// Withdraws a voting, e.g. after a refresh left it partially resolved
    pub fn unmark(&mut self, date_key: &str, id: &str) -> LedgerResult<()> {
        let removed = self
            .completed
            .get_mut(date_key)
            .is_some_and(|ids| ids.remove(id));
        if removed {
            self.save()?;
        }
        Ok(())
    }

    /// Rewrites the whole file
    pub fn save(&mut self) -> LedgerResult<()> {
        let json =
            serde_json::to_string_pretty(&self.completed).map_err(|source| LedgerError::Json {
                path: self.path.clone(),
                source,
            })?;
        replace_file(&self.path, json.as_bytes())
    }
}

fn subdirectories(dir: &Path) -> LedgerResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| LedgerError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| LedgerError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}
