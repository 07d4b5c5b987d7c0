//! Listing page reader
//!
//! A listing page shows one card per voting in the requested date range.
//! Past the last result the site renders a "no results" notice instead of
//! cards; that notice is checked before any card is read.

use crate::dates::{date_key, parse_dutch_date, DateRange};
use crate::source::{element_text, Candidate, ListingPage};
use crate::ScrapeError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.m-card").expect("Invalid card selector"));
static CARD_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h4.u-mt-0 > a[href]").expect("Invalid card link selector"));
static CARD_DATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time.u-text-primary").expect("Invalid card date selector"));
static CARD_ID: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.u-text-dark-gray").expect("Invalid card id selector"));

/// Builds the URL of listing page `page` for `range`
pub fn listing_url(
    base: &Url,
    listing_path: &str,
    range: &DateRange,
    page: u32,
) -> Result<Url, url::ParseError> {
    let mut url = base.join(listing_path)?;
    url.query_pairs_mut()
        .append_pair("qry", "*")
        .append_pair("fld_tk_categorie", "Kamerstukken")
        .append_pair("fld_prl_kamerstuk", "Stemmingsuitslagen")
        .append_pair("fromdate", &date_key(range.from))
        .append_pair("todate", &date_key(range.to))
        .append_pair("srt", "date:desc:date")
        .append_pair("page", &page.to_string());
    Ok(url)
}

/// Reads a listing page
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - URL the page was fetched from, for error messages
/// * `base` - Base URL that card links are resolved against
/// * `marker` - End-of-results text
///
/// # Returns
///
/// The candidates in listing order, or an end-of-results page. A page with
/// no cards and no marker is returned as-is; the crawler decides what that
/// means.
pub fn parse_listing(
    html: &str,
    page_url: &str,
    base: &Url,
    marker: &str,
) -> Result<ListingPage, ScrapeError> {
    if html.contains(marker) {
        return Ok(ListingPage::end());
    }

    let document = Html::parse_document(html);
    let candidates = document
        .select(&CARD)
        .enumerate()
        .map(|(index, card)| parse_card(&card, index, page_url, base))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListingPage {
        candidates,
        end_of_results: false,
    })
}

fn parse_card(
    card: &ElementRef,
    index: usize,
    page_url: &str,
    base: &Url,
) -> Result<Candidate, ScrapeError> {
    let missing = |what: &str| ScrapeError::structure(page_url, format!("card {} has no {}", index, what));

    let href = card
        .select(&CARD_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| missing("link"))?;
    let link = base.join(href.trim())?;

    let time = card.select(&CARD_DATE).next().ok_or_else(|| missing("date"))?;
    let date = time
        .value()
        .attr("datetime")
        .and_then(|attr| attr.get(..10))
        .and_then(parse_dutch_date)
        .or_else(|| parse_dutch_date(&element_text(&time)))
        .ok_or_else(|| missing("readable date"))?;

    let id = card
        .select(&CARD_ID)
        .next()
        .map(|p| element_text(&p))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| missing("id"))?;

    Ok(Candidate {
        id,
        date_key: date_key(date),
        link: link.to_string(),
    })
}
