//! Voting page reader
//!
//! A voting page describes one roll-call event and lists the motions voted
//! on as cards, each with its decision. Any deviation from the expected
//! markup here is fatal for the run.

use crate::records::Voting;
use crate::source::{element_text, query_ids, NestedLink, VotingDocument};
use crate::ScrapeError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="dcterms.title"]"#).expect("Invalid title selector")
});
static SUBTITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").expect("Invalid h2 selector"));
static SUBTITLE_DATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.u-font-normal").expect("Invalid date selector"));
static MOTION_CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.m-card").expect("Invalid card selector"));
static MOTION_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h3.m-card__title > a[href]").expect("Invalid motion link selector")
});
static DECISION_PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.u-mt-8").expect("Invalid decision selector"));
static DECISION_LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.u-font-bold").expect("Invalid label selector"));

/// Reads a voting page into its voting row and motion links
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - URL the page was fetched from; carries the ids
/// * `base` - Base URL that motion links are resolved against
pub fn parse_voting(html: &str, page_url: &Url, base: &Url) -> Result<VotingDocument, ScrapeError> {
    let fail = |message: &str| ScrapeError::structure(page_url.as_str(), message);

    let (voting_id, voting_did) =
        query_ids(page_url).ok_or_else(|| fail("id and did missing from URL"))?;

    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|t| t.trim().to_string())
        .ok_or_else(|| fail("voting title is missing"))?;

    let subtitles: Vec<ElementRef> = document.select(&SUBTITLE).collect();
    let [subtitle] = subtitles.as_slice() else {
        return Err(fail("voting subtitle is missing or not unique"));
    };
    let date = subtitle
        .select(&SUBTITLE_DATE)
        .next()
        .map(|span| element_text(&span))
        .filter(|d| !d.is_empty())
        .ok_or_else(|| fail("voting date is missing"))?;
    let kind = leading_text(subtitle).ok_or_else(|| fail("voting kind is missing"))?;

    let nested = document
        .select(&MOTION_CARD)
        .enumerate()
        .map(|(index, card)| parse_motion_card(&card, index, page_url, base))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VotingDocument {
        voting: Voting {
            voting_id,
            voting_did,
            title,
            date,
            kind,
        },
        nested,
    })
}

/// Text before the first child element, e.g. the kind in `Kind <span>date</span>`
fn leading_text(element: &ElementRef) -> Option<String> {
    let first = element.children().next()?;
    let text = first.value().as_text()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_motion_card(
    card: &ElementRef,
    index: usize,
    page_url: &Url,
    base: &Url,
) -> Result<NestedLink, ScrapeError> {
    let href = card
        .select(&MOTION_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| {
            ScrapeError::structure(page_url.as_str(), format!("cannot find link of motion {}", index))
        })?;
    let url = base.join(href.trim())?;

    let decision = card
        .select(&DECISION_PARAGRAPH)
        .find(|p| element_text(p).contains("Besluit"))
        .and_then(|p| p.select(&DECISION_LABEL).next())
        .map(|label| element_text(&label).trim_matches('.').to_string())
        .ok_or_else(|| {
            ScrapeError::structure(
                page_url.as_str(),
                format!("cannot find decision of motion {}", index),
            )
        })?;

    Ok(NestedLink {
        url: url.to_string(),
        decision,
    })
}
