//! tk-stemmingen: a resumable scraper for parliamentary voting results
//!
//! This crate harvests roll-call votes ("stemmingen") and the motions voted on
//! within them from the Tweede Kamer website, normalizes them into four fixed
//! tables and writes one directory of CSV files per vote. Two on-disk ledgers
//! make every run safely interruptible and resumable.

pub mod config;
pub mod crawler;
pub mod dates;
pub mod extract;
pub mod output;
pub mod records;
pub mod source;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Fatal error type: anything that aborts a run
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Page {url} does not respond (HTTP {status})")]
    Status { url: String, status: u16 },

    #[error("Unexpected page structure at {url}: {message}")]
    Structure { url: String, message: String },

    #[error("Invalid record set for {id}: {message}")]
    RecordSet { id: String, message: String },

    #[error("Nested item {url} failed in strict mode: {source}")]
    Strict {
        url: String,
        source: RecoverableError,
    },

    #[error("Ledger error: {0}")]
    Ledger(#[from] state::LedgerError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    pub fn structure(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structure {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Failure scoped to one nested motion document
///
/// These never leave the detail resolver except through the error ledger,
/// unless strict mode escalates them to [`ScrapeError::Strict`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecoverableError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Unexpected structure at {url}: {message}")]
    Structure { url: String, message: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),
}

impl RecoverableError {
    pub fn structure(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structure {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRequest, Crawler};
pub use dates::DateRange;
pub use records::{Motion, RecordSet, Sponsor, VoteDetail, Voting};
pub use state::{ErrorStore, ProgressStore};
