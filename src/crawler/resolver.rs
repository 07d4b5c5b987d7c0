//! Detail resolver: one voting into one record set
//!
//! The voting page itself must read cleanly; any problem there is fatal.
//! Each motion is resolved on its own, and a motion that fails is recorded
//! in the error ledger while its siblings carry on. The outcome reports
//! whether the voting came through whole.

use crate::crawler::motion::resolve_motion;
use crate::extract::TextExtractor;
use crate::records::RecordSet;
use crate::source::{Candidate, Source};
use crate::state::ErrorStore;
use crate::ScrapeError;

/// Terminal state of resolving one voting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
    /// Every motion resolved; no failures remain on record
    FullyResolved,
    /// At least one motion failed and was quarantined
    PartiallyResolved,
}

/// Record set of one voting and how completely it was resolved
#[derive(Debug, Clone)]
pub struct Resolution {
    pub records: RecordSet,
    pub status: ResolutionStatus,
    /// Number of motions quarantined in this pass
    pub failures: usize,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.status == ResolutionStatus::FullyResolved
    }
}

/// Resolves votings through a [`Source`]
pub struct DetailResolver<'a, S, E> {
    source: &'a S,
    extractor: &'a E,
    strict: bool,
}

impl<'a, S: Source, E: TextExtractor> DetailResolver<'a, S, E> {
    /// # Arguments
    ///
    /// * `strict` - Escalate the first failing motion instead of quarantining it
    pub fn new(source: &'a S, extractor: &'a E, strict: bool) -> Self {
        Self {
            source,
            extractor,
            strict,
        }
    }

    /// Resolves one voting, keeping the error ledger in step
    ///
    /// Ledger rows are keyed by the candidate's id. A motion that resolves
    /// clears its own earlier failure; a voting that resolves whole clears
    /// all of them.
    pub async fn resolve(
        &self,
        candidate: &Candidate,
        errors: &mut ErrorStore,
    ) -> Result<Resolution, ScrapeError> {
        let document = self.source.fetch_voting_document(&candidate.link).await?;
        if document.nested.is_empty() {
            return Err(ScrapeError::structure(
                candidate.link.as_str(),
                "voting has no motions",
            ));
        }

        let voting_id = document.voting.voting_id.clone();
        if voting_id != candidate.id {
            return Err(ScrapeError::RecordSet {
                id: candidate.id.clone(),
                message: format!("voting page carries id {}", voting_id),
            });
        }
        let mut records = RecordSet::for_voting(document.voting);
        records.single_voting(&candidate.id)?;

        let mut failures = 0;
        for link in &document.nested {
            tracing::debug!("  {}", link.url);

            match resolve_motion(self.source, self.extractor, &voting_id, link).await {
                Ok(set) => {
                    records.append(set);
                    errors.remove_url(&candidate.id, &link.url)?;
                }
                Err(err) if self.strict => {
                    return Err(ScrapeError::Strict {
                        url: link.url.clone(),
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::warn!("Motion {} of {} failed: {}", link.url, candidate.id, err);
                    errors.add(&candidate.id, Some(link.url.as_str()), err.to_string())?;
                    failures += 1;
                }
            }
        }

        if let Some((voting_id, motion_id)) = records.find_orphan() {
            return Err(ScrapeError::RecordSet {
                id: candidate.id.clone(),
                message: format!("rows for {}/{} have no motion row", voting_id, motion_id),
            });
        }

        let status = if failures == 0 {
            errors.remove_all(&candidate.id)?;
            ResolutionStatus::FullyResolved
        } else {
            ResolutionStatus::PartiallyResolved
        };

        Ok(Resolution {
            records,
            status,
            failures,
        })
    }
}
