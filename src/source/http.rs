//! HTTP implementation of the upstream content source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use tokio::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::wire::{map_videos, RawSearchResponse, RawTrendingResponse};
use super::{ContentSource, SearchResults};
use crate::cache::ResponseCache;
use crate::types::Candidate;
use crate::TARGET_WEB_REQUEST;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SEARCH_CACHE_TTL_MS: i64 = 15 * 60 * 1000;
const TRENDING_CACHE_TTL_MS: i64 = 5 * 60 * 1000;
const CACHE_CAPACITY: usize = 512;

/// Create the client used for all upstream requests.
pub fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .gzip(true)
        .timeout(REQUEST_TIMEOUT)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
}

/// Queries the proxy API over HTTP with a read-through response cache.
///
/// Fresh cache entries short-circuit the request entirely; when a request
/// fails and a stale entry exists, the stale entry is served instead so a
/// flaky upstream degrades to old results rather than empty ones.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: Url,
    cache: ResponseCache,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid upstream base URL: {}", base_url))?;
        Ok(Self {
            client: create_http_client()?,
            base_url,
            cache: ResponseCache::new(CACHE_CAPACITY),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .with_context(|| format!("Invalid upstream path: {}", path))?;
        for (name, value) in params {
            url.query_pairs_mut().append_pair(name, value);
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(target: TARGET_WEB_REQUEST, "Requesting {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Non-success status {} from {}", response.status(), url);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {}", url))
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn search(&self, query: &str, page: u32) -> Result<SearchResults> {
        let key = format!("search-{}-{}", query, page);
        if let Some(hit) = self.cache.get_fresh::<SearchResults>(&key) {
            debug!(target: TARGET_WEB_REQUEST, "Cache hit for search \"{}\" page {}", query, page);
            return Ok(hit);
        }

        let url = self.endpoint("search", &[("q", query), ("page", &page.to_string())])?;
        match self.fetch::<RawSearchResponse>(url).await {
            Ok(raw) => {
                let results = SearchResults {
                    videos: map_videos(raw.videos),
                    shorts: map_videos(raw.shorts),
                    next_page: raw.next_page_token,
                };
                self.cache.store(&key, &results, SEARCH_CACHE_TTL_MS);
                Ok(results)
            }
            Err(err) => {
                if let Some(stale) = self.cache.get_stale::<SearchResults>(&key) {
                    warn!(
                        target: TARGET_WEB_REQUEST,
                        "Search \"{}\" failed, serving stale cache: {}", query, err
                    );
                    return Ok(stale);
                }
                Err(err)
            }
        }
    }

    async fn trending(&self) -> Result<Vec<Candidate>> {
        let key = "trending";
        if let Some(hit) = self.cache.get_fresh::<Vec<Candidate>>(key) {
            debug!(target: TARGET_WEB_REQUEST, "Cache hit for trending feed");
            return Ok(hit);
        }

        let url = self.endpoint("fvideo", &[])?;
        match self.fetch::<RawTrendingResponse>(url).await {
            Ok(raw) => {
                let videos = map_videos(raw.videos);
                self.cache.store(key, &videos, TRENDING_CACHE_TTL_MS);
                Ok(videos)
            }
            Err(err) => {
                if let Some(stale) = self.cache.get_stale::<Vec<Candidate>>(key) {
                    warn!(
                        target: TARGET_WEB_REQUEST,
                        "Trending fetch failed, serving stale cache: {}", err
                    );
                    return Ok(stale);
                }
                Err(err)
            }
        }
    }
}
