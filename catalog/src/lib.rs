//! HTTP client for the Google Books `volumes` API.

use anyhow::Result;
use feed::{CatalogQuery, CatalogSource, FeedError, FeedResult, RawVolume, VolumeList};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::time::Duration;
use tokio::time::sleep;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/books/v1";

#[derive(Debug, Clone)]
pub struct BooksConfig {
    /// API root, e.g. `https://www.googleapis.com/books/v1`.
    pub api_base: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Pause before every request to stay clear of the rate limit.
    pub request_delay: Duration,
    pub user_agent: String,
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            timeout: Duration::from_secs(12),
            request_delay: Duration::from_millis(100),
            user_agent: concat!("book-feed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

pub struct BooksClient {
    client: Client,
    base: Url,
    config: BooksConfig,
}

impl BooksClient {
    pub fn new(config: BooksConfig) -> Result<Self> {
        let base = Url::parse(&config.api_base)?;
        if base.cannot_be_a_base() {
            anyhow::bail!("api base {} cannot be a base url", config.api_base);
        }
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, base, config })
    }

    pub fn config(&self) -> &BooksConfig { &self.config }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_key(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) if !key.is_empty() => req.query(&[("key", key.as_str())]),
            _ => req,
        }
    }

    async fn pause(&self) {
        if !self.config.request_delay.is_zero() { sleep(self.config.request_delay).await; }
    }
}

impl CatalogSource for BooksClient {
    async fn search(&self, query: &CatalogQuery) -> FeedResult<Vec<RawVolume>> {
        self.pause().await;
        let req = self.client.get(self.url(&["volumes"])).query(&[
            ("q", query.q()),
            ("startIndex", query.offset.to_string()),
            ("maxResults", query.limit.to_string()),
            ("orderBy", query.sort.as_str().to_string()),
        ]);
        let resp = self.with_key(req).send().await.map_err(fetch_failed)?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(q = %query.q(), "catalog rate limited search");
            return Err(FeedError::RateLimited);
        }
        if !status.is_success() {
            return Err(FeedError::FetchFailed(format!("search returned {status}")));
        }
        let bytes = resp.bytes().await.map_err(fetch_failed)?;
        let list: VolumeList = serde_json::from_slice(&bytes).map_err(|e| FeedError::FetchFailed(e.to_string()))?;
        tracing::debug!(q = %query.q(), offset = query.offset, returned = list.items.len(), "catalog search");
        Ok(list.items)
    }

    async fn lookup(&self, id: &str) -> FeedResult<RawVolume> {
        if id.trim().is_empty() { return Err(FeedError::NotFound(id.to_string())); }
        self.pause().await;
        let req = self.client.get(self.url(&["volumes", id]));
        let resp = self.with_key(req).send().await.map_err(fetch_failed)?;
        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(FeedError::RateLimited),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => return Err(FeedError::NotFound(id.to_string())),
            s if !s.is_success() => return Err(FeedError::FetchFailed(format!("lookup returned {s}"))),
            _ => {}
        }
        let bytes = resp.bytes().await.map_err(fetch_failed)?;
        serde_json::from_slice(&bytes).map_err(|e| FeedError::FetchFailed(e.to_string()))
    }
}

fn fetch_failed(e: reqwest::Error) -> FeedError { FeedError::FetchFailed(e.to_string()) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_keep_the_api_prefix() {
        let c = BooksClient::new(BooksConfig { api_base: "http://127.0.0.1:9/books/v1/".into(), ..Default::default() }).unwrap();
        assert_eq!(c.url(&["volumes"]).as_str(), "http://127.0.0.1:9/books/v1/volumes");
        assert_eq!(c.url(&["volumes", "a/b"]).as_str(), "http://127.0.0.1:9/books/v1/volumes/a%2Fb");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(BooksClient::new(BooksConfig { api_base: "mailto:x@y".into(), ..Default::default() }).is_err());
    }
}
