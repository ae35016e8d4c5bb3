use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::config::AppConfig;
use crate::{Error, Result};

const MAX_FEED_BYTES: usize = 5 * 1024 * 1024;

/// Source of raw feed text
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current feed document
    async fn fetch(&self) -> Result<String>;
}

/// Feed fetcher for a single configured URL
pub struct FeedFetcher {
    client: Client,
    url: Url,
    user_agent: String,
    max_bytes: usize,
}

impl FeedFetcher {
    /// Create a fetcher from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_url(
            &config.feed.url,
            &config.feed.user_agent,
            config.feed.request_timeout_secs,
        )
    }

    pub fn with_url(url: &str, user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let url = Url::parse(url)?;
        let client = Self::build_client(timeout_secs)?;

        Ok(Self {
            client,
            url,
            user_agent: user_agent.to_string(),
            max_bytes: MAX_FEED_BYTES,
        })
    }

    /// Cap on the response body size
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn build_client(timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(Error::Http)
    }

    fn build_headers(user_agent: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/rss+xml,application/xml;q=0.9,text/xml;q=0.8,*/*;q=0.5"),
        );
        let ua = HeaderValue::from_str(user_agent)
            .map_err(|e| Error::Config(format!("Invalid user agent '{}': {}", user_agent, e)))?;
        headers.insert(USER_AGENT, ua);
        Ok(headers)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn ensure_content_size(&self, size: usize) -> Result<()> {
        if size > self.max_bytes {
            return Err(Error::FeedFormat(format!(
                "Feed too large ({} bytes) for URL: {}",
                size, self.url
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch(&self) -> Result<String> {
        tracing::info!("Fetching feed from: {}", self.url);

        let mut response = self
            .client
            .get(self.url.clone())
            .headers(Self::build_headers(&self.user_agent)?)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(
            status = %status,
            user_agent = %self.user_agent,
            content_type = ?response.headers().get(reqwest::header::CONTENT_TYPE),
            "Got feed response"
        );

        if !status.is_success() {
            return Err(Error::FeedFormat(format!("HTTP {} for URL: {}", status, self.url)));
        }

        if let Some(length) = response.content_length() {
            self.ensure_content_size(usize::try_from(length).unwrap_or(usize::MAX))?;
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            self.ensure_content_size(body.len() + chunk.len())?;
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/feed")
            .match_header("user-agent", "feedsummarizer-test/1.0")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body("<rss><channel></channel></rss>")
            .create_async()
            .await;

        let fetcher =
            FeedFetcher::with_url(&format!("{}/feed", server.url()), "feedsummarizer-test/1.0", 5).unwrap();
        let body = fetcher.fetch().await.unwrap();

        assert_eq!(body, "<rss><channel></channel></rss>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_feed_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/feed")
            .with_status(503)
            .with_body("try later")
            .create_async()
            .await;

        let fetcher = FeedFetcher::with_url(&format!("{}/feed", server.url()), "ua", 5).unwrap();
        let err = fetcher.fetch().await.unwrap_err();

        match err {
            Error::FeedFormat(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_body("x".repeat(64))
            .create_async()
            .await;

        let fetcher = FeedFetcher::with_url(&format!("{}/feed", server.url()), "ua", 5)
            .unwrap()
            .with_max_bytes(16);
        let err = fetcher.fetch().await.unwrap_err();

        match err {
            Error::FeedFormat(msg) => assert!(msg.contains("too large")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_chunked_body_over_limit_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_chunked_body(|w| w.write_all(&[b'x'; 64]))
            .create_async()
            .await;

        let fetcher = FeedFetcher::with_url(&format!("{}/feed", server.url()), "ua", 5)
            .unwrap()
            .with_max_bytes(16);
        let err = fetcher.fetch().await.unwrap_err();

        assert!(matches!(err, Error::FeedFormat(msg) if msg.contains("too large")));
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            FeedFetcher::with_url("not a url", "ua", 5),
            Err(Error::UrlParse(_))
        ));
    }
}
