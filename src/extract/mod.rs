//! Plain-text extraction from downloaded motion documents
//!
//! Motions without an inline rendering are published only as a PDF or DOCX
//! download. The format is recognised from the leading bytes; anything else
//! is rejected as unsupported. Conversion itself is delegated to an external
//! command per format (by default `pdftotext` and `pandoc`).

use crate::config::ExtractorConfig;
use crate::RecoverableError;
use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Number of leading bytes shown when a document cannot be classified
const SNIFF_PREVIEW: usize = 8;

/// Errors raised while turning a document into text
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unrecognised document starting with {0}")]
    Unsupported(String),

    #[error("`{program}` failed: {message}")]
    Command { program: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ExtractError> for RecoverableError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unsupported(preview) => RecoverableError::UnsupportedFormat(preview),
            other => RecoverableError::Extraction(other.to_string()),
        }
    }
}

/// The two document formats the site publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Classifies a document by its magic bytes
    pub fn sniff(bytes: &[u8]) -> Result<Self, ExtractError> {
        if bytes.starts_with(b"%PDF-") {
            return Ok(Self::Pdf);
        }
        // DOCX is a ZIP container whose entry names live under word/
        if bytes.starts_with(b"PK\x03\x04") && contains(bytes, b"word/") {
            return Ok(Self::Docx);
        }
        Err(ExtractError::Unsupported(hex::encode(
            &bytes[..bytes.len().min(SNIFF_PREVIEW)],
        )))
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Converts a binary document into plain text
pub trait TextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Extractor that pipes documents through external commands
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    pdf_command: Vec<String>,
    docx_command: Vec<String>,
}

impl CommandExtractor {
    pub fn new(pdf_command: Vec<String>, docx_command: Vec<String>) -> Self {
        Self {
            pdf_command,
            docx_command,
        }
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.pdf_command.clone(), config.docx_command.clone())
    }

    fn command_for(&self, format: DocumentFormat) -> &[String] {
        match format {
            DocumentFormat::Pdf => &self.pdf_command,
            DocumentFormat::Docx => &self.docx_command,
        }
    }
}

impl TextExtractor for CommandExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let format = DocumentFormat::sniff(bytes)?;
        let (program, args) = self
            .command_for(format)
            .split_first()
            .ok_or_else(|| ExtractError::Command {
                program: String::new(),
                message: format!("no command configured for {:?}", format),
            })?;

        tracing::debug!("Extracting {:?} text with `{}`", format, program);
        let output = run_piped(program, args, bytes)?;
        Ok(collapse_whitespace(&output))
    }
}

/// Runs `program`, feeding `input` on stdin and returning its stdout
fn run_piped(program: &str, args: &[String], input: &[u8]) -> Result<String, ExtractError> {
    let command_error = |message: String| ExtractError::Command {
        program: program.to_string(),
        message,
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| command_error(e.to_string()))?;

    // Writing from a separate thread keeps a large document from
    // deadlocking against a full stdout pipe.
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| command_error("stdin not captured".to_string()))?;
    let input = input.to_vec();
    let writer = std::thread::spawn(move || stdin.write_all(&input));

    let output = child.wait_with_output()?;
    match writer.join() {
        Ok(result) => {
            // A converter may stop reading early; its exit status decides
            if let Err(e) = result {
                tracing::trace!("Writing to `{}` stopped early: {}", program, e);
            }
        }
        Err(_) => return Err(command_error("stdin writer panicked".to_string())),
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(command_error(format!(
            "exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Collapses every run of whitespace into one space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
