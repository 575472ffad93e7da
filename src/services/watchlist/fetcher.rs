use std::time::Duration;

use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client as HttpClient,
};

use crate::error::FetchError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches raw page markup from the scraped site
///
/// Isolates the network layer so paginator and enricher can be tested
/// against fixed HTML.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page, returning its body on a 2xx response
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher with a browser identity and a per-request timeout
#[derive(Clone)]
pub struct HttpPageFetcher {
    http_client: HttpClient,
}

impl HttpPageFetcher {
    /// Fetcher for watchlist listing pages
    pub fn listing(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { http_client })
    }

    /// Fetcher for film detail pages, which reject bare clients more often
    pub fn detail(timeout: Duration, referer: &str) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(
            HeaderName::from_static("upgrade-insecure-requests"),
            HeaderValue::from_static("1"),
        );
        if let Ok(value) = HeaderValue::from_str(referer) {
            headers.insert(header::REFERER, value);
        }

        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url = %url, "Fetching page");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Page request failed");
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}
