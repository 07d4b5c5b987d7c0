//! The tweedekamer.nl implementation of [`Source`]

use crate::config::Config;
use crate::dates::DateRange;
use crate::source::{
    build_http_client, fetch_bytes, fetch_text, listing_url, parse_listing, parse_motion,
    parse_voting, ListingPage, MotionDocument, Source, VotingDocument,
};
use crate::{RecoverableError, ScrapeError};
use reqwest::Client;
use url::Url;

/// Reads listing, voting and motion pages over HTTP
#[derive(Debug, Clone)]
pub struct TweedeKamerSource {
    client: Client,
    base: Url,
    listing_path: String,
    end_of_results_marker: String,
}

impl TweedeKamerSource {
    /// Creates a source from the `[source]` and `[user-agent]` settings
    pub fn new(config: &Config) -> Result<Self, ScrapeError> {
        let base = Url::parse(&config.source.base_url)?;
        let client = build_http_client(&config.source, &config.user_agent).map_err(|source| {
            ScrapeError::Http {
                url: base.to_string(),
                source,
            }
        })?;

        Ok(Self {
            client,
            base,
            listing_path: config.source.listing_path.clone(),
            end_of_results_marker: config.source.end_of_results_marker.clone(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl Source for TweedeKamerSource {
    async fn fetch_listing_page(
        &self,
        page: u32,
        range: &DateRange,
    ) -> Result<ListingPage, ScrapeError> {
        let url = listing_url(&self.base, &self.listing_path, range, page)?;
        let html = fetch_text(&self.client, url.as_str()).await?;
        parse_listing(&html, url.as_str(), &self.base, &self.end_of_results_marker)
    }

    async fn fetch_voting_document(&self, link: &str) -> Result<VotingDocument, ScrapeError> {
        let url = Url::parse(link)?;
        let html = fetch_text(&self.client, link).await?;
        parse_voting(&html, &url, &self.base)
    }

    async fn fetch_motion_document(&self, link: &str) -> Result<MotionDocument, RecoverableError> {
        let url = Url::parse(link)
            .map_err(|e| RecoverableError::structure(link, format!("invalid motion link: {}", e)))?;
        let html = fetch_text(&self.client, link).await?;
        parse_motion(&html, &url, &self.base)
    }

    async fn fetch_binary(&self, link: &str) -> Result<Vec<u8>, RecoverableError> {
        Ok(fetch_bytes(&self.client, link).await?)
    }
}
