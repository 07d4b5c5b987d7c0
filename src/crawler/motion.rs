//! Resolution of one nested motion into its rows
//!
//! Bill-like documents (bills, final texts) carry no motion text or formal
//! tally, so only their metadata and sponsors are kept. Every other motion
//! needs a download link and at least one sponsor; its text comes from the
//! inline rendering when there is one, otherwise from the downloaded
//! document.

use crate::crawler::tally::interpret_tally;
use crate::extract::TextExtractor;
use crate::records::{Motion, RecordSet, Sponsor};
use crate::source::{MotionDocument, NestedLink, Source};
use crate::RecoverableError;

/// Kinds that are handled as bills, compared case-insensitively
pub const BILL_LIKE_KINDS: [&str; 3] = ["wetsvoorstel", "voorstel van wet", "eindtekst"];

pub fn is_bill_like(kind: &str) -> bool {
    let kind = kind.trim().to_lowercase();
    BILL_LIKE_KINDS.contains(&kind.as_str())
}

/// Fetches one motion page and turns it into a record set
///
/// # Arguments
///
/// * `source` - Where the motion page and its download are fetched
/// * `extractor` - Converts the download when there is no inline text
/// * `voting_id` - Id of the enclosing voting, stamped on every row
/// * `link` - The motion link and its decision label
pub async fn resolve_motion<S: Source, E: TextExtractor>(
    source: &S,
    extractor: &E,
    voting_id: &str,
    link: &NestedLink,
) -> Result<RecordSet, RecoverableError> {
    let document = source.fetch_motion_document(&link.url).await?;
    let fail = |message: &str| RecoverableError::structure(link.url.as_str(), message);

    let MotionDocument {
        header,
        download,
        inline_text,
        sponsors,
        tally,
    } = document;

    let mut motion = Motion::new(voting_id, header, link.decision.clone());
    let sponsors: Vec<Sponsor> = sponsors
        .into_iter()
        .map(|s| Sponsor {
            voting_id: voting_id.to_string(),
            motion_id: motion.motion_id.clone(),
            name: s.name,
            kind: s.kind,
        })
        .collect();

    if is_bill_like(&motion.kind) {
        tracing::debug!("{} is a {}; keeping metadata only", motion.motion_id, motion.kind);
        return Ok(RecordSet {
            motions: vec![motion],
            sponsors,
            ..RecordSet::default()
        });
    }

    let download = download.ok_or_else(|| fail("motion download link is missing"))?;
    if sponsors.is_empty() {
        return Err(fail("sponsors are missing"));
    }

    let (text, is_fallback) = match inline_text {
        Some(text) => (text, false),
        None => {
            tracing::debug!("No inline text for {}; extracting {}", motion.motion_id, download);
            let bytes = source.fetch_binary(&download).await?;
            (extractor.extract_text(&bytes)?, true)
        }
    };
    motion.text = Some(text);
    motion.is_fallback = is_fallback;
    motion.download = Some(download);

    let details = match tally {
        Some(section) => {
            let details =
                interpret_tally(voting_id, &motion.motion_id, &section.header, &section.rows)
                    .map_err(|message| fail(message.as_str()))?;
            motion.set_tally(section.outcome, section.counts);
            details
        }
        None => Vec::new(),
    };

    Ok(RecordSet {
        votings: Vec::new(),
        motions: vec![motion],
        sponsors,
        details,
    })
}
