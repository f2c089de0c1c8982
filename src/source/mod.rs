//! Upstream content providers: the search/trending abstraction and its
//! HTTP implementation.

pub mod http;
pub mod wire;

pub use http::HttpSource;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Candidate;

/// One page of keyword-search results, already mapped to candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub videos: Vec<Candidate>,
    pub shorts: Vec<Candidate>,
    pub next_page: Option<String>,
}

impl SearchResults {
    /// Flattens regular videos and shorts into one candidate list.
    pub fn into_candidates(self) -> Vec<Candidate> {
        let mut all = self.videos;
        all.extend(self.shorts);
        all
    }
}

/// A logical upstream the aggregator can query. Implementations are free to
/// fail or hang; the aggregator guards every call with a deadline and
/// degrades to empty results.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Keyword search, paginated.
    async fn search(&self, query: &str, page: u32) -> Result<SearchResults>;

    /// The unparameterized popular feed.
    async fn trending(&self) -> Result<Vec<Candidate>>;
}
