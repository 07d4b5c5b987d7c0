//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop, which:
//! - Walks listing pages from index 0 until the end-of-results marker
//! - Filters candidates by selection and the progress ledger
//! - Resolves, writes and checkpoints each remaining voting in listing order
//!
//! A voting is marked complete only after its tables are on disk, and only
//! if it resolved without quarantined failures.

use crate::config::BehaviourConfig;
use crate::crawler::resolver::{DetailResolver, ResolutionStatus};
use crate::dates::DateRange;
use crate::extract::TextExtractor;
use crate::output::{CrawlStats, RecordWriter};
use crate::source::{Candidate, Source};
use crate::state::{ErrorStore, ProgressStore};
use crate::ScrapeError;
use std::collections::BTreeSet;

/// What one run should harvest
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub range: DateRange,
    /// Only these voting ids are considered when set
    pub selection: Option<BTreeSet<String>>,
    /// Reprocess votings already marked complete
    pub full_refresh: bool,
}

impl CrawlRequest {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            selection: None,
            full_refresh: false,
        }
    }

    /// Parses a whitespace-separated id list
    pub fn parse_selection(text: &str) -> BTreeSet<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn is_selected(&self, id: &str) -> bool {
        self.selection.as_ref().is_some_and(|ids| ids.contains(id))
    }
}

/// Policy switches of the crawler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlOptions {
    /// A selected voting is processed even if already complete
    pub selection_forces_refresh: bool,
    /// The first failing motion aborts the run
    pub strict_nested: bool,
}

impl CrawlOptions {
    pub fn from_config(config: &BehaviourConfig) -> Self {
        Self {
            selection_forces_refresh: config.selection_forces_refresh,
            strict_nested: config.strict_nested,
        }
    }
}

/// Outcome of filtering one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateDecision {
    Process,
    NotSelected,
    AlreadyComplete,
}

/// Main crawler structure
pub struct Crawler<S, E> {
    source: S,
    extractor: E,
    writer: RecordWriter,
    progress: ProgressStore,
    errors: ErrorStore,
    options: CrawlOptions,
}

impl<S: Source, E: TextExtractor> Crawler<S, E> {
    /// Creates a crawler over already loaded ledgers
    ///
    /// # Arguments
    ///
    /// * `source` - Where listing, voting and motion pages come from
    /// * `extractor` - Text extraction for downloaded documents
    /// * `writer` - Writes each voting's tables into the output tree
    /// * `progress` / `errors` - The two ledgers, loaded (and healed) by the caller
    /// * `options` - Policy switches
    pub fn new(
        source: S,
        extractor: E,
        writer: RecordWriter,
        progress: ProgressStore,
        errors: ErrorStore,
        options: CrawlOptions,
    ) -> Self {
        Self {
            source,
            extractor,
            writer,
            progress,
            errors,
            options,
        }
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn errors(&self) -> &ErrorStore {
        &self.errors
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Decides whether a candidate is processed in this run
    pub fn decide(&self, request: &CrawlRequest, candidate: &Candidate) -> CandidateDecision {
        if request.selection.is_some() && !request.is_selected(&candidate.id) {
            return CandidateDecision::NotSelected;
        }

        let forced = request.full_refresh
            || (self.options.selection_forces_refresh && request.is_selected(&candidate.id));
        if !forced && self.progress.is_complete(&candidate.date_key, &candidate.id) {
            return CandidateDecision::AlreadyComplete;
        }

        CandidateDecision::Process
    }

    /// Runs the crawl loop until the listing reports end-of-results
    ///
    /// Any fatal error aborts the run at once; everything checkpointed up to
    /// that point stays valid for the next run.
    pub async fn run(&mut self, request: &CrawlRequest) -> Result<CrawlStats, ScrapeError> {
        tracing::info!("Harvesting votings for {}", request.range);
        let mut stats = CrawlStats::default();

        let mut page_index: u32 = 0;
        loop {
            tracing::info!("Page {:02}", page_index);
            let page = self
                .source
                .fetch_listing_page(page_index, &request.range)
                .await?;
            stats.pages_visited += 1;

            if page.end_of_results {
                tracing::info!("No further pages found");
                break;
            }
            if page.candidates.is_empty() {
                return Err(ScrapeError::structure(
                    format!("listing page {}", page_index),
                    "no voting cards found on a page without end-of-results marker",
                ));
            }

            for candidate in &page.candidates {
                stats.candidates_seen += 1;
                match self.decide(request, candidate) {
                    CandidateDecision::NotSelected => {
                        tracing::debug!("Skipping {} (not selected)", candidate.id);
                        stats.skipped_unselected += 1;
                    }
                    CandidateDecision::AlreadyComplete => {
                        tracing::debug!(
                            "Skipping {} {} (already complete)",
                            candidate.date_key,
                            candidate.id
                        );
                        stats.skipped_completed += 1;
                    }
                    CandidateDecision::Process => {
                        match self.process(candidate).await? {
                            ResolutionStatus::FullyResolved => stats.fully_resolved += 1,
                            ResolutionStatus::PartiallyResolved => stats.partially_resolved += 1,
                        }
                    }
                }
            }

            page_index += 1;
        }

        tracing::info!(
            "Run finished: {} pages, {} candidates, {} fully resolved, {} partially resolved, {} skipped",
            stats.pages_visited,
            stats.candidates_seen,
            stats.fully_resolved,
            stats.partially_resolved,
            stats.skipped_completed + stats.skipped_unselected
        );
        Ok(stats)
    }

    /// Resolves, writes and checkpoints one voting
    async fn process(&mut self, candidate: &Candidate) -> Result<ResolutionStatus, ScrapeError> {
        tracing::info!("{} {} {}", candidate.date_key, candidate.id, candidate.link);

        let resolver =
            DetailResolver::new(&self.source, &self.extractor, self.options.strict_nested);
        let resolution = resolver.resolve(candidate, &mut self.errors).await?;

        self.writer
            .write(&candidate.date_key, &candidate.id, &resolution.records)?;

        match resolution.status {
            ResolutionStatus::FullyResolved => {
                self.progress
                    .mark_complete(&candidate.date_key, &candidate.id)?;
            }
            ResolutionStatus::PartiallyResolved => {
                tracing::warn!(
                    "{} resolved with {} quarantined motions; will retry next run",
                    candidate.id,
                    resolution.failures
                );
                self.progress.unmark(&candidate.date_key, &candidate.id)?;
            }
        }

        Ok(resolution.status)
    }
}
