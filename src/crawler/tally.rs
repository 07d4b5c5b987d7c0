//! Interpretation of the per-group vote table of a motion
//!
//! The table comes in two shapes: one row per parliamentary group, or one
//! row per member with the group cells spanning the group's rows. A row
//! carrying all columns starts a group; shorter rows continue it.

use crate::records::VoteDetail;

/// Column titles of a table reported per group
const GROUP_HEADER: [&str; 3] = ["Fracties", "Zetels", "Voor/Tegen"];

/// Column titles of a table reported per member
const MEMBER_HEADER: [&str; 4] = ["Fracties", "Zetels", "Kamerlid", "Voor/Tegen"];

/// Granularity of a tally table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyShape {
    PerGroup,
    PerMember,
}

impl TallyShape {
    /// Recognises a header by its leading columns; trailing columns are free
    pub fn classify(header: &[String]) -> Option<Self> {
        if starts_with(header, &MEMBER_HEADER) {
            Some(Self::PerMember)
        } else if starts_with(header, &GROUP_HEADER) {
            Some(Self::PerGroup)
        } else {
            None
        }
    }
}

fn starts_with(header: &[String], expected: &[&str]) -> bool {
    header.len() >= expected.len() && header.iter().zip(expected).all(|(h, e)| h == e)
}

/// Normalized key of a value column, e.g. "Niet deelgenomen" -> "niet_deelgenomen"
fn column_key(title: &str) -> String {
    title.to_lowercase().replace(' ', "_")
}

/// Turns tally rows into vote details for one motion
///
/// # Arguments
///
/// * `voting_id` / `motion_id` - Parent ids stamped on every row
/// * `header` - Column titles
/// * `rows` - Cell texts of the data rows
///
/// # Returns
///
/// The vote details in table order, or a message describing why the table
/// cannot be read.
pub fn interpret_tally(
    voting_id: &str,
    motion_id: &str,
    header: &[String],
    rows: &[Vec<String>],
) -> Result<Vec<VoteDetail>, String> {
    if TallyShape::classify(header).is_none() {
        return Err(format!("Unexpected table headers: {:?}", header));
    }
    let value_keys: Vec<String> = header[2..].iter().map(|h| column_key(h)).collect();

    let mut group: Option<(String, u32)> = None;
    let mut details = Vec::with_capacity(rows.len());

    for (index, cells) in rows.iter().enumerate() {
        let values = if cells.len() == header.len() {
            let seats = cells[1].trim().parse::<u32>().map_err(|_| {
                format!("row {}: seat count {:?} is not a number", index, cells[1])
            })?;
            group = Some((cells[0].clone(), seats));
            &cells[2..]
        } else {
            cells.as_slice()
        };

        let Some((group_name, seats)) = &group else {
            return Err(format!("row {} precedes the first group", index));
        };

        let value = |key: &str| -> Option<String> {
            value_keys
                .iter()
                .zip(values)
                .find(|(k, _)| k.as_str() == key)
                .map(|(_, v)| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        details.push(VoteDetail {
            voting_id: voting_id.to_string(),
            motion_id: motion_id.to_string(),
            group_name: group_name.clone(),
            seats: *seats,
            member: value("kamerlid"),
            vote: value("voor/tegen"),
            not_participated: value("niet_deelgenomen").is_some(),
            mistake: value("vergissing").is_some(),
        });
    }

    Ok(details)
}
