//! Crawler module for harvesting votings
//!
//! This module contains the core harvesting logic, including:
//! - The listing walk and candidate filtering
//! - Resolution of one voting and its nested motions
//! - Interpretation of per-group and per-member tally tables

mod coordinator;
mod motion;
mod resolver;
mod tally;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{CandidateDecision, CrawlOptions, CrawlRequest, Crawler};
pub use motion::{is_bill_like, resolve_motion, BILL_LIKE_KINDS};
pub use resolver::{DetailResolver, Resolution, ResolutionStatus};
pub use tally::{interpret_tally, TallyShape};
