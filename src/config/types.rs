use serde::Deserialize;

/// Main configuration structure for tk-stemmingen
///
/// Every section is optional; a missing file or section falls back to the
/// defaults for scraping tweedekamer.nl.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub behaviour: BehaviourConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Where and how listing and detail pages are fetched
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Site root; relative links on fetched pages are resolved against it
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Path of the paginated voting results listing
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,

    /// Text the listing shows once the page index runs past the last result
    #[serde(
        rename = "end-of-results-marker",
        default = "default_end_of_results_marker"
    )]
    pub end_of_results_marker: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default = "default_contact_email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root of the `<date>/<id>/` output tree
    #[serde(rename = "data-dir", default = "default_data_dir")]
    pub data_dir: String,

    /// Directory holding `progress.json` and `errors.csv`
    #[serde(rename = "state-dir", default = "default_state_dir")]
    pub state_dir: String,

    /// SQLite database written by the `load` command
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

/// Switches for behaviour that is a policy choice rather than a given
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BehaviourConfig {
    /// Reprocess selected items even when already complete
    #[serde(rename = "selection-forces-refresh", default)]
    pub selection_forces_refresh: bool,

    /// Abort the run on the first failing motion instead of quarantining it
    #[serde(rename = "strict-nested", default)]
    pub strict_nested: bool,
}

/// External commands used to turn downloaded documents into text
///
/// Each command receives the document on stdin and must print plain text.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    #[serde(rename = "pdf-command", default = "default_pdf_command")]
    pub pdf_command: Vec<String>,

    #[serde(rename = "docx-command", default = "default_docx_command")]
    pub docx_command: Vec<String>,
}

fn default_base_url() -> String {
    "https://www.tweedekamer.nl".to_string()
}

fn default_listing_path() -> String {
    "/kamerstukken/stemmingsuitslagen".to_string()
}

fn default_end_of_results_marker() -> String {
    "Geen zoekresultaten".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_crawler_name() -> String {
    "tk-stemmingen".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://github.com/tk-stemmingen/tk-stemmingen".to_string()
}

fn default_contact_email() -> String {
    "stemmingen@example.org".to_string()
}

fn default_data_dir() -> String {
    "../data".to_string()
}

fn default_state_dir() -> String {
    ".run".to_string()
}

fn default_database_path() -> String {
    "stemmingen.db".to_string()
}

fn default_pdf_command() -> Vec<String> {
    ["pdftotext", "-layout", "-", "-"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_docx_command() -> Vec<String> {
    ["pandoc", "--from", "docx", "--to", "plain"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_path: default_listing_path(),
            end_of_results_marker: default_end_of_results_marker(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
            contact_email: default_contact_email(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state_dir: default_state_dir(),
            database_path: default_database_path(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            pdf_command: default_pdf_command(),
            docx_command: default_docx_command(),
        }
    }
}
