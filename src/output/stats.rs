//! Run and ledger statistics
//!
//! `CrawlStats` is filled in by the crawler during a run; `LedgerStatistics`
//! is computed from the two ledgers for the `stats` command.

use crate::state::{ErrorStore, ProgressStore};

/// Counters collected over one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Listing pages fetched, including the end-of-results page
    pub pages_visited: u64,

    /// Candidate cards seen on listing pages
    pub candidates_seen: u64,

    /// Candidates dropped by the id selection
    pub skipped_unselected: u64,

    /// Candidates already marked complete
    pub skipped_completed: u64,

    /// Votings written and marked complete
    pub fully_resolved: u64,

    /// Votings written with quarantined nested failures
    pub partially_resolved: u64,
}

impl CrawlStats {
    /// Number of votings that were resolved and written
    pub fn processed(&self) -> u64 {
        self.fully_resolved + self.partially_resolved
    }
}

/// Summary of the persisted ledgers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStatistics {
    /// Dates with at least one completed voting
    pub dates: usize,

    /// Completed votings over all dates
    pub completed: usize,

    /// Rows in the error ledger
    pub quarantined_rows: usize,

    /// Distinct votings with at least one error row
    pub quarantined_items: usize,

    /// Earliest and latest date-key in the progress ledger
    pub date_span: Option<(String, String)>,
}

/// Computes statistics from loaded ledgers
///
/// # Arguments
///
/// * `progress` - The (already healed) progress ledger
/// * `errors` - The error ledger
pub fn ledger_statistics(progress: &ProgressStore, errors: &ErrorStore) -> LedgerStatistics {
    let dates = progress.dates();
    let non_empty: Vec<&String> = dates
        .iter()
        .filter(|(_, ids)| !ids.is_empty())
        .map(|(date, _)| date)
        .collect();

    let date_span = match (non_empty.first(), non_empty.last()) {
        (Some(first), Some(last)) => Some(((*first).clone(), (*last).clone())),
        _ => None,
    };

    LedgerStatistics {
        dates: non_empty.len(),
        completed: progress.len(),
        quarantined_rows: errors.len(),
        quarantined_items: errors.unresolved_ids().len(),
        date_span,
    }
}

/// Prints the counters of a finished run to stdout
pub fn print_crawl_stats(stats: &CrawlStats) {
    println!("=== Run Summary ===\n");
    println!("  Listing pages visited: {}", stats.pages_visited);
    println!("  Candidates seen: {}", stats.candidates_seen);
    println!("  Skipped (not selected): {}", stats.skipped_unselected);
    println!("  Skipped (already complete): {}", stats.skipped_completed);
    println!("  Fully resolved: {}", stats.fully_resolved);
    println!("  Partially resolved: {}", stats.partially_resolved);
    println!();

    if stats.partially_resolved > 0 {
        println!(
            "{} votings have quarantined failures and will be retried on the next run.",
            stats.partially_resolved
        );
    }
}

/// Prints ledger statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `errors` - The error ledger, listed in full when non-empty
pub fn print_ledger_statistics(stats: &LedgerStatistics, errors: &ErrorStore) {
    println!("=== Ledger Statistics ===\n");

    println!("Progress:");
    println!("  Completed votings: {}", stats.completed);
    println!("  Dates: {}", stats.dates);
    if let Some((first, last)) = &stats.date_span {
        println!("  Span: {} .. {}", first, last);
    }
    println!();

    println!("Quarantine:");
    println!("  Votings with failures: {}", stats.quarantined_items);
    println!("  Failure rows: {}", stats.quarantined_rows);

    if !errors.is_empty() {
        println!();
        for entry in errors.entries() {
            println!(
                "  - {} {}: {}",
                entry.voting_id,
                entry.url.as_deref().unwrap_or("-"),
                entry.message
            );
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::open_ledgers;
    use tempfile::TempDir;

    #[test]
    fn test_processed() {
        let stats = CrawlStats {
            fully_resolved: 3,
            partially_resolved: 2,
            ..CrawlStats::default()
        };
        assert_eq!(stats.processed(), 5);
    }

    #[test]
    fn test_ledger_statistics() {
        let dir = TempDir::new().unwrap();
        let (mut progress, mut errors) = open_ledgers(dir.path()).unwrap();
        progress.mark_complete("2024-01-11", "C").unwrap();
        progress.mark_complete("2024-01-10", "A").unwrap();
        progress.mark_complete("2024-01-10", "B").unwrap();
        errors.add("X", Some("https://x/1"), "a").unwrap();
        errors.add("X", Some("https://x/2"), "b").unwrap();

        let stats = ledger_statistics(&progress, &errors);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.dates, 2);
        assert_eq!(stats.quarantined_rows, 2);
        assert_eq!(stats.quarantined_items, 1);
        assert_eq!(
            stats.date_span,
            Some(("2024-01-10".to_string(), "2024-01-11".to_string()))
        );
    }

    #[test]
    fn test_empty_ledgers() {
        let dir = TempDir::new().unwrap();
        let (progress, errors) = open_ledgers(dir.path()).unwrap();

        let stats = ledger_statistics(&progress, &errors);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.date_span, None);
    }
}
