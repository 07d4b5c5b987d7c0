//! In-memory source and extractor for crawler tests

use crate::dates::DateRange;
use crate::extract::{ExtractError, TextExtractor};
use crate::records::{MotionHeader, Voting};
use crate::source::{
    Candidate, ListingPage, MotionDocument, NestedLink, Source, SponsorEntry, VotingDocument,
};
use crate::{RecoverableError, ScrapeError};
use std::cell::RefCell;
use std::collections::HashMap;

/// Source serving canned documents and recording every request
#[derive(Default)]
pub struct FakeSource {
    pages: Vec<ListingPage>,
    votings: HashMap<String, VotingDocument>,
    motions: HashMap<String, Result<MotionDocument, RecoverableError>>,
    binaries: HashMap<String, Result<Vec<u8>, RecoverableError>>,
    requests: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listing page; pages past the last one report end-of-results
    pub fn with_page(mut self, candidates: Vec<Candidate>) -> Self {
        self.pages.push(ListingPage {
            candidates,
            end_of_results: false,
        });
        self
    }

    pub fn with_voting(mut self, link: &str, document: VotingDocument) -> Self {
        self.votings.insert(link.to_string(), document);
        self
    }

    pub fn with_motion(
        mut self,
        link: &str,
        document: Result<MotionDocument, RecoverableError>,
    ) -> Self {
        self.motions.insert(link.to_string(), document);
        self
    }

    pub fn with_binary(mut self, link: &str, bytes: Result<Vec<u8>, RecoverableError>) -> Self {
        self.binaries.insert(link.to_string(), bytes);
        self
    }

    /// Every link requested so far, listing pages as `page:<n>`
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Number of requests for one link
    pub fn request_count(&self, link: &str) -> usize {
        self.requests.borrow().iter().filter(|r| *r == link).count()
    }

    fn record(&self, link: &str) {
        self.requests.borrow_mut().push(link.to_string());
    }
}

impl Source for FakeSource {
    async fn fetch_listing_page(
        &self,
        page: u32,
        _range: &DateRange,
    ) -> Result<ListingPage, ScrapeError> {
        self.record(&format!("page:{}", page));
        Ok(self
            .pages
            .get(page as usize)
            .cloned()
            .unwrap_or_else(ListingPage::end))
    }

    async fn fetch_voting_document(&self, link: &str) -> Result<VotingDocument, ScrapeError> {
        self.record(link);
        self.votings.get(link).cloned().ok_or(ScrapeError::Status {
            url: link.to_string(),
            status: 404,
        })
    }

    async fn fetch_motion_document(&self, link: &str) -> Result<MotionDocument, RecoverableError> {
        self.record(link);
        self.motions.get(link).cloned().unwrap_or_else(|| {
            Err(RecoverableError::Transport {
                url: link.to_string(),
                message: "not found".to_string(),
            })
        })
    }

    async fn fetch_binary(&self, link: &str) -> Result<Vec<u8>, RecoverableError> {
        self.record(link);
        self.binaries.get(link).cloned().unwrap_or_else(|| {
            Err(RecoverableError::Transport {
                url: link.to_string(),
                message: "not found".to_string(),
            })
        })
    }
}

/// Extractor returning fixed text, or rejecting every document
pub enum FakeExtractor {
    Text(String),
    Unsupported,
}

impl FakeExtractor {
    pub fn ok(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    pub fn unsupported() -> Self {
        Self::Unsupported
    }
}

impl TextExtractor for FakeExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Unsupported => Err(ExtractError::Unsupported(hex::encode(
                &bytes[..bytes.len().min(8)],
            ))),
        }
    }
}

/// Candidate whose voting page lives at `https://tk/v/<id>`
pub fn candidate(id: &str, date_key: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        date_key: date_key.to_string(),
        link: format!("https://tk/v/{}", id),
    }
}

/// Voting page for `id` listing the given motion links
pub fn voting_document(id: &str, motion_links: &[&str]) -> VotingDocument {
    VotingDocument {
        voting: Voting {
            voting_id: id.to_string(),
            voting_did: format!("{}-did", id),
            title: format!("Stemmingen {}", id),
            date: "woensdag 10 januari 2024".to_string(),
            kind: "Stemmingen".to_string(),
        },
        nested: motion_links
            .iter()
            .map(|url| NestedLink {
                url: url.to_string(),
                decision: "Aangenomen".to_string(),
            })
            .collect(),
    }
}

/// Ordinary motion with inline text, a download and one sponsor
pub fn motion_document(id: &str) -> MotionDocument {
    MotionDocument {
        header: MotionHeader {
            motion_id: id.to_string(),
            motion_did: format!("{}-did", id),
            document_nr: "36410-12".to_string(),
            date: "9 januari 2024".to_string(),
            title: format!("Motie {}", id),
            kind: "Motie".to_string(),
        },
        download: Some(format!("https://tk/download/{}", id)),
        inline_text: Some("De Kamer, gehoord de beraadslaging".to_string()),
        sponsors: vec![SponsorEntry {
            name: "J. Klaver".to_string(),
            kind: "Indiener".to_string(),
        }],
        tally: None,
    }
}
