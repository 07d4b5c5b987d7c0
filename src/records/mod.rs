//! Record sets: the four output tables of one voting
//!
//! A [`RecordSet`] is built in memory while one voting is resolved. Nested
//! motion results are folded in with [`RecordSet::merge`], which appends each
//! table's rows and preserves their order.

mod rows;

pub use rows::{Motion, MotionHeader, Sponsor, Table, VoteCounts, VoteDetail, Voting, TABLE_ORDER};

use crate::ScrapeError;

/// Rows of all four tables for one voting (or one nested motion)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    pub votings: Vec<Voting>,
    pub motions: Vec<Motion>,
    pub sponsors: Vec<Sponsor>,
    pub details: Vec<VoteDetail>,
}

impl RecordSet {
    /// The empty record set; identity of [`merge`](Self::merge)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record set seeded with the single voting row of an item
    pub fn for_voting(voting: Voting) -> Self {
        Self {
            votings: vec![voting],
            ..Self::default()
        }
    }

    /// Concatenates each table of `other` after the rows of `self`
    pub fn merge(mut self, other: RecordSet) -> RecordSet {
        self.append(other);
        self
    }

    /// In-place form of [`merge`](Self::merge)
    pub fn append(&mut self, other: RecordSet) {
        self.votings.extend(other.votings);
        self.motions.extend(other.motions);
        self.sponsors.extend(other.sponsors);
        self.details.extend(other.details);
    }

    /// Returns the voting row, failing unless there is exactly one
    pub fn single_voting(&self, id: &str) -> Result<&Voting, ScrapeError> {
        match self.votings.as_slice() {
            [voting] => Ok(voting),
            rows => Err(ScrapeError::RecordSet {
                id: id.to_string(),
                message: format!("expected exactly one voting row, found {}", rows.len()),
            }),
        }
    }

    /// Checks that every sponsor and detail row belongs to a motion in this set
    ///
    /// Returns the first orphaned `(voting_id, motion_id)` pair, if any.
    pub fn find_orphan(&self) -> Option<(&str, &str)> {
        let has_parent = |voting_id: &str, motion_id: &str| {
            self.motions
                .iter()
                .any(|m| m.voting_id == voting_id && m.motion_id == motion_id)
        };

        self.sponsors
            .iter()
            .map(|s| (s.voting_id.as_str(), s.motion_id.as_str()))
            .chain(
                self.details
                    .iter()
                    .map(|d| (d.voting_id.as_str(), d.motion_id.as_str())),
            )
            .find(|(voting_id, motion_id)| !has_parent(voting_id, motion_id))
    }
}
