//! Storage module for loading harvested votings into SQLite
//!
//! This module handles:
//! - Schema creation for the four tables
//! - Bulk loading of the `<date>/<id>/` output tree, one transaction per item

mod loader;
mod schema;

pub use loader::{LoadSummary, Loader};
pub use schema::{
    initialize_schema, is_date_column, is_flag_column, table_columns, FLAG_COLUMNS, SCHEMA_SQL,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during loading
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column {column} in {path}")]
    UnknownColumn { path: PathBuf, column: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
