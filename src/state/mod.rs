//! State module for tracking harvest progress across runs
//!
//! Two ledgers survive between runs, and they are the only state that does:
//!
//! - `ErrorStore`: quarantine of recoverable per-motion failures (`errors.csv`)
//! - `ProgressStore`: votings already fully resolved, per date (`progress.json`)
//!
//! Both are read fully into memory on load and rewritten in full after every
//! mutation. Concurrent runs against the same ledger files are unsupported.

mod errors;
mod progress;

// Re-export main types
pub use errors::{ErrorEntry, ErrorStore};
pub use progress::ProgressStore;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the progress ledger inside the state directory
pub const PROGRESS_FILE: &str = "progress.json";

/// File name of the error ledger inside the state directory
pub const ERRORS_FILE: &str = "errors.csv";

/// Errors that can occur while reading or writing a ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed progress ledger {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Malformed error ledger {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Loads both ledgers from a state directory
///
/// The error ledger is loaded first so the progress ledger can drop any
/// voting that still has quarantined failures.
pub fn open_ledgers(state_dir: &Path) -> LedgerResult<(ProgressStore, ErrorStore)> {
    let errors = ErrorStore::load(state_dir.join(ERRORS_FILE))?;
    let progress = ProgressStore::load(state_dir.join(PROGRESS_FILE), &errors)?;
    Ok((progress, errors))
}

/// Replaces `path` with `contents` via a temporary sibling file
fn replace_file(path: &Path, contents: &[u8]) -> LedgerResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, contents).map_err(|e| LedgerError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| LedgerError::io(path, e))?;
    tracing::trace!("Rewrote ledger {}", path.display());
    Ok(())
}
