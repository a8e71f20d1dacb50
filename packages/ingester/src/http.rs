//! HTTP client wrapper for fetching statute pages.
//!
//! Fetches are not retried: a timeout or an error status aborts
//! the current document.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use url::Url;

use crate::config::{ACCEPT_LANGUAGE as ACCEPT_LANGUAGE_VALUE, HTTP_TIMEOUT_SECS};
use crate::error::{IngesterError, Result};

/// User agent string identifying this ingester.
const USER_AGENT: &str = concat!("statute-ingester/", env!("CARGO_PKG_VERSION"));

/// Charset used when the server does not declare one.
const FALLBACK_CHARSET: &str = "utf-8";

/// Source of statute pages.
///
/// The dispatcher uses it to re-fetch a resolved full-text document; tests
/// substitute a closure.
pub trait PageFetcher {
    /// Fetch the page at `url` and return its decoded body.
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<F> PageFetcher for F
where
    F: Fn(&str) -> Result<String>,
{
    fn fetch(&self, url: &str) -> Result<String> {
        self(url)
    }
}

/// Create a configured HTTP client with the default timeout.
pub fn create_client() -> Result<Client> {
    create_client_with_timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
}

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` with the given timeout, the ingester user
/// agent and a French-first `Accept-Language` header.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
    );

    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetch an HTML page.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to fetch
///
/// # Returns
/// The response body decoded with the declared charset, or UTF-8 when the
/// server declares none.
pub fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|source| IngesterError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let response = client.get(parsed).send().map_err(|source| IngesterError::Fetch {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(IngesterError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .text_with_charset(FALLBACK_CHARSET)
        .map_err(|source| IngesterError::Fetch {
            url: url.to_string(),
            source,
        })
}

/// [`PageFetcher`] backed by a shared blocking client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default-configured client.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(create_client()?))
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "Fetching page");
        fetch_html(&self.client, url)
    }
}
