//! Seed-query derivation and concurrent candidate aggregation.
//!
//! Every upstream call is raced against a deadline and degrades to an empty
//! result on timeout or error; the aggregation as a whole never fails. The
//! result of a call that loses its race is dropped, never awaited further.

use futures::future::join_all;
use lazy_static::lazy_static;
use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::config::{FeedParams, RankingConfig};
use crate::profile::UserProfile;
use crate::source::ContentSource;
use crate::types::{Candidate, HistoryEntry};
use crate::TARGET_WEB_REQUEST;

/// How many words of a cleaned title become a seed query.
const TITLE_SEED_WORDS: usize = 4;

lazy_static! {
    /// Bracketed decorations stripped from titles before they seed a search.
    static ref TITLE_BRACKETS: Regex = Regex::new(r"【.*?】|\[.*?\]|\(.*?\)").unwrap();
}

/// The two candidate pools produced by one aggregation pass.
#[derive(Debug, Default)]
pub struct CandidatePools {
    pub popular: Vec<Candidate>,
    pub personalized: Vec<Candidate>,
}

/// The upstream page parameter advances only once per `coalesce` logical
/// pages, trading recency depth for consistent latency on deep scrolls.
pub fn upstream_page(page: u32, coalesce: u32) -> u32 {
    (page.max(1) - 1) / coalesce.max(1) + 1
}

/// Strips bracketed decorations and truncates a title into a compact query.
pub fn clean_title_for_search(title: &str) -> String {
    TITLE_BRACKETS
        .replace_all(title, "")
        .trim()
        .split_whitespace()
        .take(TITLE_SEED_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derives the personalized seed queries for one invocation.
///
/// Preference order: the top-weighted profile keywords; else sampled recent
/// watch-history titles; else the configured generic topics (cold start).
/// `suffix` is appended to every query (the shorts feed passes ` #shorts`).
pub fn personalized_seeds(
    profile: &UserProfile,
    history: &[HistoryEntry],
    config: &RankingConfig,
    suffix: &str,
    rng: &mut impl Rng,
) -> Vec<String> {
    let top = profile.vector.top_keywords(config.seed_keyword_count);
    if !top.is_empty() {
        return top
            .into_iter()
            .map(|keyword| format!("{}{}", keyword, suffix))
            .collect();
    }

    if !history.is_empty() {
        let sample: Vec<&HistoryEntry> = history
            .choose_multiple(rng, config.history_seed_count)
            .collect();
        let seeds: Vec<String> = sample
            .into_iter()
            .map(|entry| clean_title_for_search(&entry.title))
            .filter(|cleaned| !cleaned.is_empty())
            .map(|cleaned| format!("{} related{}", cleaned, suffix))
            .collect();
        if !seeds.is_empty() {
            return seeds;
        }
    }

    config
        .fallback_topics
        .iter()
        .map(|topic| format!("{}{}", topic, suffix))
        .collect()
}

/// Samples the popular-query pool for one shorts-feed invocation.
pub fn sample_popular_queries(config: &RankingConfig, rng: &mut impl Rng) -> Vec<String> {
    config
        .popular_shorts_queries
        .choose_multiple(rng, config.popular_query_count)
        .cloned()
        .collect()
}

/// Issues every upstream call for one invocation concurrently: one search
/// per query in both sets plus one trending call, each guarded by its
/// deadline. Returns the flattened popular and personalized pools.
pub async fn aggregate(
    source: &dyn ContentSource,
    seed_queries: &[String],
    popular_queries: &[String],
    query_page: u32,
    params: &FeedParams,
) -> CandidatePools {
    let trending = guarded_trending(source, params.trending_timeout);
    let popular_searches = join_all(
        popular_queries
            .iter()
            .map(|q| guarded_search(source, q, query_page, params.search_timeout)),
    );
    let seed_searches = join_all(
        seed_queries
            .iter()
            .map(|q| guarded_search(source, q, query_page, params.search_timeout)),
    );

    let (trending_result, popular_results, seed_results) =
        tokio::join!(trending, popular_searches, seed_searches);

    let mut popular = trending_result;
    popular.extend(popular_results.into_iter().flatten());
    let personalized: Vec<Candidate> = seed_results.into_iter().flatten().collect();

    debug!(
        target: TARGET_WEB_REQUEST,
        "Aggregated {} popular and {} personalized candidates from {} queries",
        popular.len(),
        personalized.len(),
        seed_queries.len() + popular_queries.len() + 1
    );

    CandidatePools {
        popular,
        personalized,
    }
}

async fn guarded_search(
    source: &dyn ContentSource,
    query: &str,
    page: u32,
    deadline: Duration,
) -> Vec<Candidate> {
    match timeout(deadline, source.search(query, page)).await {
        Ok(Ok(results)) => results.into_candidates(),
        Ok(Err(err)) => {
            warn!(target: TARGET_WEB_REQUEST, "Search \"{}\" failed: {}", query, err);
            Vec::new()
        }
        Err(_) => {
            warn!(target: TARGET_WEB_REQUEST, "Search \"{}\" timed out after {:?}", query, deadline);
            Vec::new()
        }
    }
}

async fn guarded_trending(source: &dyn ContentSource, deadline: Duration) -> Vec<Candidate> {
    match timeout(deadline, source.trending()).await {
        Ok(Ok(videos)) => videos,
        Ok(Err(err)) => {
            warn!(target: TARGET_WEB_REQUEST, "Trending fetch failed: {}", err);
            Vec::new()
        }
        Err(_) => {
            warn!(target: TARGET_WEB_REQUEST, "Trending fetch timed out after {:?}", deadline);
            Vec::new()
        }
    }
}
