//! Row types for the four output tables
//!
//! Every child row carries its parents' ids; nothing relies on row order.

use serde::{Deserialize, Serialize};

/// Static description of one output table
pub trait Table {
    /// File stem of the table inside an item directory
    const FILE_STEM: &'static str;

    /// Column names, in serialization order
    const COLUMNS: &'static [&'static str];
}

/// One roll-call event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voting {
    pub voting_id: String,
    pub voting_did: String,
    pub title: String,
    pub date: String,
    pub kind: String,
}

impl Table for Voting {
    const FILE_STEM: &'static str = "voting";
    const COLUMNS: &'static [&'static str] = &["voting_id", "voting_did", "title", "date", "kind"];
}

/// Vote totals of a formal tally; all three are known or none is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteCounts {
    pub votes_for: u32,
    pub required: u32,
    pub total: u32,
}

/// One proposal voted on within a voting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Motion {
    pub voting_id: String,
    pub motion_id: String,
    pub motion_did: String,
    pub document_nr: String,
    pub date: String,
    pub title: String,
    pub kind: String,
    pub text: Option<String>,
    pub is_fallback: bool,
    pub download: Option<String>,
    pub decision: String,
    pub outcome: Option<String>,
    votes_for: Option<u32>,
    votes_required: Option<u32>,
    votes_total: Option<u32>,
}

impl Table for Motion {
    const FILE_STEM: &'static str = "motion";
    const COLUMNS: &'static [&'static str] = &[
        "voting_id",
        "motion_id",
        "motion_did",
        "document_nr",
        "date",
        "title",
        "kind",
        "text",
        "is_fallback",
        "download",
        "decision",
        "outcome",
        "votes_for",
        "votes_required",
        "votes_total",
    ];
}

/// Identity and descriptive fields shared by every motion row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionHeader {
    pub motion_id: String,
    pub motion_did: String,
    pub document_nr: String,
    pub date: String,
    pub title: String,
    pub kind: String,
}

impl Motion {
    /// Creates a motion row without text, download or tally
    pub fn new(voting_id: impl Into<String>, header: MotionHeader, decision: impl Into<String>) -> Self {
        Self {
            voting_id: voting_id.into(),
            motion_id: header.motion_id,
            motion_did: header.motion_did,
            document_nr: header.document_nr,
            date: header.date,
            title: header.title,
            kind: header.kind,
            text: None,
            is_fallback: false,
            download: None,
            decision: decision.into(),
            outcome: None,
            votes_for: None,
            votes_required: None,
            votes_total: None,
        }
    }

    /// Sets the tally outcome and its counts together
    pub fn set_tally(&mut self, outcome: impl Into<String>, counts: VoteCounts) {
        self.outcome = Some(outcome.into());
        self.votes_for = Some(counts.votes_for);
        self.votes_required = Some(counts.required);
        self.votes_total = Some(counts.total);
    }

    /// Vote counts, if this motion had a formal tally
    ///
    /// Returns `None` for rows whose count columns are only partly filled,
    /// which can only come from a hand-edited file.
    pub fn counts(&self) -> Option<VoteCounts> {
        match (self.votes_for, self.votes_required, self.votes_total) {
            (Some(votes_for), Some(required), Some(total)) => Some(VoteCounts {
                votes_for,
                required,
                total,
            }),
            _ => None,
        }
    }
}

/// A submitter or co-submitter of a motion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    pub voting_id: String,
    pub motion_id: String,
    pub name: String,
    pub kind: String,
}

impl Table for Sponsor {
    const FILE_STEM: &'static str = "sponsors";
    const COLUMNS: &'static [&'static str] = &["voting_id", "motion_id", "name", "kind"];
}

/// One entity's recorded vote within a motion's tally
///
/// `member` is empty when the tally is reported per parliamentary group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDetail {
    pub voting_id: String,
    pub motion_id: String,
    pub group_name: String,
    pub seats: u32,
    pub member: Option<String>,
    pub vote: Option<String>,
    pub not_participated: bool,
    pub mistake: bool,
}

impl Table for VoteDetail {
    const FILE_STEM: &'static str = "details";
    const COLUMNS: &'static [&'static str] = &[
        "voting_id",
        "motion_id",
        "group_name",
        "seats",
        "member",
        "vote",
        "not_participated",
        "mistake",
    ];
}

/// File stems in the order a loader must insert them
pub const TABLE_ORDER: [&str; 4] = [
    Voting::FILE_STEM,
    Motion::FILE_STEM,
    Sponsor::FILE_STEM,
    VoteDetail::FILE_STEM,
];
