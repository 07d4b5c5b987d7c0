//! Output module for writing harvested votings and reporting on runs
//!
//! This module handles:
//! - Writing the four tables of a voting into its item directory
//! - Collecting and printing run and ledger statistics

pub mod stats;
mod writer;

pub use stats::{
    ledger_statistics, print_crawl_stats, print_ledger_statistics, CrawlStats, LedgerStatistics,
};
pub use writer::{table_path, RecordWriter, TABLE_EXTENSION};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing output tables
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
