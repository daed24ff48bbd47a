//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - Referrer header and redirect policy
//! - The politeness delay applied before every request

use crate::config::CrawlerConfig;
use reqwest::{header::REFERER, redirect::Policy, Client};
use std::time::Duration;

/// Maximum number of redirects followed when redirects are enabled
const MAX_REDIRECTS: usize = 10;

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let redirect = if config.follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with the crawler's client, referrer and delay
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    referrer: Option<String>,
    delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            referrer: config.referrer.clone(),
            delay: Duration::from_millis(config.delay_ms),
        })
    }

    /// Fetches a URL after the configured delay
    ///
    /// Any HTTP status is a successful fetch; callers decide what an error
    /// status means. Only transport failures (connection, timeout, body
    /// decoding) are returned as errors.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, reqwest::Error> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut request = self.client.get(url);
        if let Some(referrer) = &self.referrer {
            request = request.header(REFERER, referrer.as_str());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!("Fetched {} with status {}", url, status);

        Ok(FetchedPage {
            status,
            body,
        })
    }
}
