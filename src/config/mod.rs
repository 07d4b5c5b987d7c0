//! Configuration module for tk-stemmingen
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration file is optional: every key has a default suitable for
//! scraping tweedekamer.nl.
//!
//! # Example
//!
//! ```no_run
//! use tk_stemmingen::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("stemmingen.toml")).unwrap();
//! println!("Ledgers live in: {}", config.output.state_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BehaviourConfig, Config, ExtractorConfig, OutputConfig, SourceConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
