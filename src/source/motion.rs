//! Motion page reader
//!
//! Reads the metadata, sponsors, text sources and the optional tally
//! section of one motion page. Failures here are scoped to the motion and
//! reported as [`RecoverableError`].

use crate::records::{MotionHeader, VoteCounts};
use crate::source::{
    element_text, query_ids, stripped_strings, MotionDocument, SponsorEntry, TallySection,
};
use crate::RecoverableError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static HIDDEN_LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.h-visually-hidden").expect("Invalid label selector"));
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("Invalid h1 selector"));
static HEADING_KIND: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.u-text-primary.u-font-normal").expect("Invalid kind selector")
});
static DOWNLOAD: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[aria-label^="Download kamerstuk"][href]"#)
        .expect("Invalid download selector")
});
static INLINE_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.m-modal__content").expect("Invalid content selector"));
static SPONSOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("ul.m-list li.m-list__item--variant-member").expect("Invalid sponsor selector")
});
static SPONSOR_ROLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.u-font-bold").expect("Invalid role selector"));
static SPONSOR_LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.m-list__label").expect("Invalid label selector"));
static SPONSOR_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.h-link-inverse").expect("Invalid name selector"));
static SECTION_HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2, h3").expect("Invalid heading selector"));
static VOTE_LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.m-vote-result__label").expect("Invalid count selector"));
static SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").expect("Invalid span selector"));
static TABLE_HEAD: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#votes-details table thead th").expect("Invalid table head selector")
});
static TABLE_ROW: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#votes-details table tbody tr").expect("Invalid table row selector")
});
static TABLE_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("Invalid cell selector"));

/// Heading text that introduces the tally section
const TALLY_HEADING: &str = "Stemmingsuitslagen";

/// Reads a motion page
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - URL the page was fetched from; carries the ids
/// * `base` - Base URL that the download link is resolved against
pub fn parse_motion(
    html: &str,
    page_url: &Url,
    base: &Url,
) -> Result<MotionDocument, RecoverableError> {
    let fail = |message: &str| RecoverableError::structure(page_url.as_str(), message);

    let (motion_id, motion_did) =
        query_ids(page_url).ok_or_else(|| fail("id and did missing from URL"))?;

    let document = Html::parse_document(html);

    let document_nr = unique_labelled_value(&document, "Nummer:")
        .ok_or_else(|| fail("document nr missing or not unique"))?;
    let date = unique_labelled_value(&document, "Datum:")
        .ok_or_else(|| fail("date missing or not unique"))?;

    let headings: Vec<(String, String)> = document
        .select(&HEADING)
        .filter_map(|h1| read_heading(&h1))
        .collect();
    let [(kind, title)] = headings.as_slice() else {
        return Err(fail("title missing or not unique"));
    };

    let download = match document
        .select(&DOWNLOAD)
        .next()
        .and_then(|a| a.value().attr("href"))
    {
        Some(href) => Some(
            base.join(href.trim())
                .map_err(|e| fail(format!("invalid download link: {}", e).as_str()))?
                .to_string(),
        ),
        None => None,
    };

    let inline_text = document
        .select(&INLINE_TEXT)
        .next()
        .map(|content| stripped_strings(&content).join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty());

    let sponsors = document
        .select(&SPONSOR)
        .map(|li| read_sponsor(&li, page_url))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();

    let tally = read_tally(&document, page_url)?;

    Ok(MotionDocument {
        header: MotionHeader {
            motion_id,
            motion_did,
            document_nr,
            date,
            title: title.clone(),
            kind: kind.clone(),
        },
        download,
        inline_text,
        sponsors,
        tally,
    })
}

/// Value following the unique visually-hidden label containing `label`
fn unique_labelled_value(document: &Html, label: &str) -> Option<String> {
    let values: Vec<Option<String>> = document
        .select(&HIDDEN_LABEL)
        .filter(|span| element_text(span).contains(label))
        .map(|span| sibling_text(&span))
        .collect();

    match values.as_slice() {
        [Some(value)] => Some(value.clone()),
        _ => None,
    }
}

fn sibling_text(element: &ElementRef) -> Option<String> {
    let node = element.next_sibling()?;
    let text = match node.value().as_text() {
        Some(text) => text.trim().to_string(),
        None => element_text(&ElementRef::wrap(node)?),
    };
    (!text.is_empty()).then_some(text)
}

/// `(kind, title)` of an `h1` carrying a kind label
fn read_heading(h1: &ElementRef) -> Option<(String, String)> {
    let kind = element_text(&h1.select(&HEADING_KIND).next()?);
    let title = stripped_strings(h1)
        .into_iter()
        .filter(|t| *t != kind && *t != ":")
        .collect::<Vec<_>>()
        .join(" ");
    let title = title.trim_start_matches(':').trim().to_string();
    Some((kind, title))
}

/// Reads one sponsor item; an item without a readable name is skipped
fn read_sponsor(li: &ElementRef, page_url: &Url) -> Result<Option<SponsorEntry>, RecoverableError> {
    let kind = li
        .select(&SPONSOR_ROLE)
        .next()
        .map(|span| element_text(&span))
        .ok_or_else(|| RecoverableError::structure(page_url.as_str(), "sponsor role is missing"))?;
    let label = li
        .select(&SPONSOR_LABEL)
        .next()
        .ok_or_else(|| RecoverableError::structure(page_url.as_str(), "sponsor name is missing"))?;

    if let Some(link) = label.select(&SPONSOR_LINK).next() {
        return Ok(Some(SponsorEntry {
            name: element_text(&link),
            kind,
        }));
    }

    // Unlinked names read "<role> <name>, <descriptor>"
    let texts = stripped_strings(&label);
    let Some(full_name) = texts.get(1) else {
        return Ok(None);
    };
    let name = match full_name.rsplit_once(',') {
        Some((name, _descriptor)) => name.trim().to_string(),
        None => full_name.to_string(),
    };
    Ok(Some(SponsorEntry { name, kind }))
}

fn read_tally(document: &Html, page_url: &Url) -> Result<Option<TallySection>, RecoverableError> {
    let fail = |message: &str| RecoverableError::structure(page_url.as_str(), message);

    let mut headings = document.select(&SECTION_HEADINGS).skip_while(|h| {
        !(h.value().name() == "h2" && element_text(h).contains(TALLY_HEADING))
    });
    if headings.next().is_none() {
        return Ok(None);
    }

    let outcome = headings
        .find(|h| h.value().name() == "h3")
        .map(|h3| element_text(&h3))
        .ok_or_else(|| fail("outcome is missing from the tally section"))?;

    let counts: Vec<u32> = document
        .select(&VOTE_LABEL)
        .take(3)
        .map(|label| label.select(&SPAN).next().and_then(|span| parse_count(&element_text(&span))))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| fail("vote counts are unreadable"))?;
    let [votes_for, required, total] = counts.as_slice() else {
        return Err(fail("vote counts are missing"));
    };

    let mut header: Vec<String> = document.select(&TABLE_HEAD).map(|th| element_text(&th)).collect();
    let mut rows: Vec<Vec<String>> = document
        .select(&TABLE_ROW)
        .map(|tr| tr.select(&TABLE_CELL).map(|cell| element_text(&cell)).collect())
        .collect();
    if header.is_empty() && !rows.is_empty() {
        header = rows.remove(0);
    }

    Ok(Some(TallySection {
        outcome,
        counts: VoteCounts {
            votes_for: *votes_for,
            required: *required,
            total: *total,
        },
        header,
        rows,
    }))
}

/// Parses "Voor: 80", ": 80" or "80"
fn parse_count(text: &str) -> Option<u32> {
    let number = text.rsplit(':').next()?.trim();
    number.parse().ok()
}
