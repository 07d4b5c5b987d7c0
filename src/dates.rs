//! Date handling for listing ranges and Dutch-language page dates
//!
//! The site renders dates in long Dutch form ("woensdag 10 januari 2024").
//! Date-keys used for directories and the progress ledger are ISO
//! `YYYY-MM-DD` strings.

use chrono::NaiveDate;
use std::fmt;

/// Format of date-keys in the output tree and progress ledger
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

const MONTHS: [(&str, u32); 12] = [
    ("januari", 1),
    ("februari", 2),
    ("maart", 3),
    ("april", 4),
    ("mei", 5),
    ("juni", 6),
    ("juli", 7),
    ("augustus", 8),
    ("september", 9),
    ("oktober", 10),
    ("november", 11),
    ("december", 12),
];

/// Inclusive date range of a listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Builds a range, defaulting `to` to `today` and clamping it to `from`
    pub fn new(from: NaiveDate, to: Option<NaiveDate>, today: NaiveDate) -> Self {
        let to = to.unwrap_or(today).max(from);
        Self { from, to }
    }

    /// Range ending today (local time) when no end date is given
    pub fn until_today(from: NaiveDate, to: Option<NaiveDate>) -> Self {
        Self::new(from, to, chrono::Local::now().date_naive())
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.from, self.to)
    }
}

/// Formats a date as a date-key
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a date written the way the site and its documents write them
///
/// Accepts ISO dates (`2024-01-10`), numeric Dutch dates (`10-01-2024`) and
/// long or abbreviated Dutch dates with an optional weekday
/// (`woensdag 10 januari 2024`, `10 jan. 2024`).
pub fn parse_dutch_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%d-%m-%Y") {
        return Some(date);
    }

    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|t| t.trim_end_matches('.'))
        .filter(|t| !t.is_empty())
        .collect();

    // Find "<day> <month> <year>" anywhere in the token stream
    tokens.windows(3).find_map(|window| {
        let day: u32 = window[0].parse().ok()?;
        let month = month_number(window[1])?;
        let year: i32 = window[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Maps a full or abbreviated Dutch month name to its number
fn month_number(name: &str) -> Option<u32> {
    if name.len() < 3 {
        return None;
    }
    // "mrt" is the customary abbreviation that is not a prefix of "maart"
    if name == "mrt" {
        return Some(3);
    }
    MONTHS
        .iter()
        .find(|(full, _)| full.starts_with(name))
        .map(|(_, number)| *number)
}
