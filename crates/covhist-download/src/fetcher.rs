//! Report fetching
//!
//! `ReportFetcher` is the seam between the batch downloader and the network.
//! `HttpFetcher` is the reqwest-backed implementation.

use crate::config::DownloadConfig;
use crate::error::{DownloadError, DownloadResult};
use async_trait::async_trait;
use tracing::trace;

/// Fetches a raw report body by URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportFetcher: Send + Sync {
    /// Fetch the full body behind `url`
    async fn fetch(&self, url: &str) -> DownloadResult<Vec<u8>>;
}

/// HTTP fetcher over a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client from configuration
    pub fn new(config: &DownloadConfig) -> DownloadResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(DownloadError::ClientSetup)?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[inline]
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> DownloadResult<Vec<u8>> {
        trace!(url, "fetching report");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::request(url, e))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_config() {
        assert!(HttpFetcher::new(&DownloadConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn malformed_url_is_request_error() {
        let fetcher = HttpFetcher::new(&DownloadConfig::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, DownloadError::Request { ref url, .. } if url == "not a url"));
    }

    #[tokio::test]
    async fn mock_fetcher_returns_body() {
        let mut mock = MockReportFetcher::new();
        mock.expect_fetch()
            .withf(|url: &str| url == "https://example.com/a.txt")
            .times(1)
            .returning(|_| Ok(b"coverage".to_vec()));

        let body = mock.fetch("https://example.com/a.txt").await.unwrap();
        assert_eq!(body, b"coverage");
    }
}
