//! Document layer: fetching and reading tweedekamer.nl pages
//!
//! This module handles:
//! - The [`Source`] capabilities the crawler consumes
//! - Building the HTTP client and classifying fetch failures
//! - Reading listing, voting and motion pages into plain structures
//!
//! Page readers only report what the markup says. Deciding which fields a
//! motion must have is left to the crawler.

mod fetcher;
mod listing;
mod motion;
mod site;
mod voting;

pub use fetcher::{build_http_client, fetch_bytes, fetch_text, FetchError};
pub use listing::{listing_url, parse_listing};
pub use motion::parse_motion;
pub use site::TweedeKamerSource;
pub use voting::parse_voting;

use crate::dates::DateRange;
use crate::records::{MotionHeader, VoteCounts, Voting};
use crate::{RecoverableError, ScrapeError};
use scraper::ElementRef;
use url::Url;

/// One voting card on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub date_key: String,
    /// Absolute URL of the voting page
    pub link: String,
}

/// Result of fetching one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub candidates: Vec<Candidate>,
    /// The page carried the end-of-results marker; `candidates` is empty
    pub end_of_results: bool,
}

impl ListingPage {
    pub fn end() -> Self {
        Self {
            candidates: Vec::new(),
            end_of_results: true,
        }
    }
}

/// A motion link on a voting page together with its decision label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedLink {
    /// Absolute URL of the motion page
    pub url: String,
    pub decision: String,
}

/// Everything read from a voting page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingDocument {
    pub voting: Voting,
    /// Motion links in document order
    pub nested: Vec<NestedLink>,
}

/// A sponsor as listed on a motion page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorEntry {
    pub name: String,
    pub kind: String,
}

/// The "Stemmingsuitslagen" part of a motion page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallySection {
    pub outcome: String,
    pub counts: VoteCounts,
    /// Column titles of the per-group table; empty when there is no table
    pub header: Vec<String>,
    /// Cell texts of each data row
    pub rows: Vec<Vec<String>>,
}

/// Everything read from a motion page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionDocument {
    pub header: MotionHeader,
    /// Absolute URL of the downloadable document
    pub download: Option<String>,
    /// Whitespace-normalized inline rendering of the motion text
    pub inline_text: Option<String>,
    pub sponsors: Vec<SponsorEntry>,
    pub tally: Option<TallySection>,
}

/// Capabilities the crawler needs from the site
///
/// Listing and voting pages fail the run; motion pages and downloads fail
/// only the motion they belong to.
#[allow(async_fn_in_trait)]
pub trait Source {
    /// Fetches listing page `page` (0-based) for `range`
    async fn fetch_listing_page(&self, page: u32, range: &DateRange)
        -> Result<ListingPage, ScrapeError>;

    /// Fetches and reads a voting page
    async fn fetch_voting_document(&self, link: &str) -> Result<VotingDocument, ScrapeError>;

    /// Fetches and reads a motion page
    async fn fetch_motion_document(&self, link: &str)
        -> Result<MotionDocument, RecoverableError>;

    /// Downloads a motion's source document
    async fn fetch_binary(&self, link: &str) -> Result<Vec<u8>, RecoverableError>;
}

/// Reads the `id` and `did` (or `dossier`) query parameters of a page URL
pub fn query_ids(url: &Url) -> Option<(String, String)> {
    let mut id = None;
    let mut did = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "id" if id.is_none() => id = Some(value.into_owned()),
            "did" | "dossier" if did.is_none() => did = Some(value.into_owned()),
            _ => {}
        }
    }
    Some((id?, did?))
}

/// Text content of an element with whitespace runs collapsed
pub(crate) fn element_text(element: &ElementRef) -> String {
    let text: String = element.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed, non-empty text fragments of an element
pub(crate) fn stripped_strings<'a>(element: &ElementRef<'a>) -> Vec<&'a str> {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}
