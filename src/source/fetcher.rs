//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the source, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests for pages and binary downloads
//! - Classifying failures so each call site can choose the error kind

use crate::config::{SourceConfig, UserAgentConfig};
use crate::{RecoverableError, ScrapeError};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A failed GET request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
}

impl From<FetchError> for ScrapeError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Transport { url, source } => ScrapeError::Http { url, source },
            FetchError::Status { url, status } => ScrapeError::Status { url, status },
        }
    }
}

impl From<FetchError> for RecoverableError {
    fn from(err: FetchError) -> Self {
        let message = err.to_string();
        let url = match err {
            FetchError::Transport { url, .. } | FetchError::Status { url, .. } => url,
        };
        RecoverableError::Transport { url, message }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `source` - Source settings (request timeout)
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    source: &SourceConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(agent)
        .timeout(Duration::from_secs(source.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

async fn get(client: &Client, url: &str) -> Result<reqwest::Response, FetchError> {
    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Fetches a page body as text
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    tracing::trace!("GET {}", url);
    let response = get(client, url).await?;
    response.text().await.map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })
}

/// Fetches a response body as raw bytes
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    tracing::trace!("GET {} (binary)", url);
    let response = get(client, url).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
    Ok(bytes.to_vec())
}
