//! The personalized feed ranking engine.
//!
//! Stateless per call: every invocation receives a full signal snapshot,
//! queries the upstream through timeout-guarded concurrent calls, and
//! produces a bounded, deduplicated, quota-balanced feed. The engine never
//! fails — at worst it returns fewer items than the target, or none.

pub mod aggregate;
pub mod filter;
pub mod mix;
pub mod score;


use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::config::{FeedParams, RankingConfig};
use crate::profile::{build_profile, NegativeProfile};
use crate::source::ContentSource;
use crate::types::{Candidate, HomeFeed, RankingSignals};
use crate::TARGET_RANKING;

use aggregate::{aggregate, personalized_seeds, sample_popular_queries, upstream_page};
use filter::{filter_candidates, BlockList};
use score::rank;

pub use score::RankedCandidate;

/// Suffix appended to shorts-feed seed queries.
const SHORTS_QUERY_SUFFIX: &str = " #shorts";

pub struct RecommendationEngine {
    source: Arc<dyn ContentSource>,
    config: RankingConfig,
    rng_seed: Option<u64>,
}

impl RecommendationEngine {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self::with_config(source, RankingConfig::default())
    }

    pub fn with_config(source: Arc<dyn ContentSource>, config: RankingConfig) -> Self {
        Self {
            source,
            config,
            rng_seed: None,
        }
    }

    /// Fixes the randomness source so repeated calls with identical inputs
    /// make identical choices. Intended for tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Builds the general home feed: a quota-mixed video list plus a
    /// shorts row. Always resolves; an unreachable upstream yields an
    /// empty feed.
    pub async fn recommended_feed(&self, signals: &RankingSignals, page: u32) -> HomeFeed {
        let mut rng = self.rng();
        let params = &self.config.home;

        let profile = build_profile(
            &signals.subscriptions,
            &signals.watch_history,
            &self.config.profile,
        );
        let seeds = personalized_seeds(
            &profile,
            &signals.watch_history,
            &self.config,
            "",
            &mut rng,
        );
        let query_page = upstream_page(page, self.config.page_coalesce);

        let pools = aggregate(self.source.as_ref(), &seeds, &[], query_page, params).await;

        // Split every pool into regular videos and shorts before filtering
        // so the shorts row dedupes against the video list.
        let (popular_videos, popular_shorts) = partition_short(pools.popular);
        let (personalized_videos, personalized_shorts) = partition_short(pools.personalized);

        let mut seen = initial_seen(signals, &[], false);
        let blocks = BlockList::from_signals(signals);
        let negatives = NegativeProfile::from_counts(signals.negative_keywords.clone());
        let subscribed_ids = subscribed_ids(signals);

        let popular_videos = self.filter(popular_videos, &mut seen, &blocks, &negatives, params);
        let personalized_videos =
            self.filter(personalized_videos, &mut seen, &blocks, &negatives, params);
        let popular_shorts = self.filter(popular_shorts, &mut seen, &blocks, &negatives, params);
        let personalized_shorts =
            self.filter(personalized_shorts, &mut seen, &blocks, &negatives, params);

        let ranked_popular = rank(
            popular_videos,
            &profile,
            true,
            &negatives,
            &subscribed_ids,
            &self.config.weights,
            &mut rng,
        );
        let ranked_personalized = rank(
            personalized_videos,
            &profile,
            false,
            &negatives,
            &subscribed_ids,
            &self.config.weights,
            &mut rng,
        );
        let videos = mix::mix(
            &ranked_popular,
            &ranked_personalized,
            params.target_total,
            params.popular_ratio,
            params.min_score_popular,
            params.min_score_personalized,
            &mut rng,
        );

        let ranked_popular_shorts = rank(
            popular_shorts,
            &profile,
            true,
            &negatives,
            &subscribed_ids,
            &self.config.weights,
            &mut rng,
        );
        let ranked_personalized_shorts = rank(
            personalized_shorts,
            &profile,
            false,
            &negatives,
            &subscribed_ids,
            &self.config.weights,
            &mut rng,
        );
        let shorts = mix::mix(
            &ranked_popular_shorts,
            &ranked_personalized_shorts,
            self.config.home_shorts_target,
            params.popular_ratio,
            params.min_score_popular,
            params.min_score_personalized,
            &mut rng,
        );

        info!(
            target: TARGET_RANKING,
            "Home feed page {}: {} videos, {} shorts",
            page,
            videos.len(),
            shorts.len()
        );

        HomeFeed { videos, shorts }
    }

    /// Builds one batch of the short-form feed. `session_seen` holds ids
    /// the caller has already surfaced this session; the batch never
    /// repeats them. Always resolves.
    pub async fn shorts_feed(
        &self,
        signals: &RankingSignals,
        page: u32,
        session_seen: &[String],
    ) -> Vec<Candidate> {
        let mut rng = self.rng();
        let params = &self.config.shorts;

        let profile = build_profile(
            &signals.subscriptions,
            &signals.shorts_history,
            &self.config.profile,
        );
        let seeds = personalized_seeds(
            &profile,
            &signals.shorts_history,
            &self.config,
            SHORTS_QUERY_SUFFIX,
            &mut rng,
        );
        let popular_queries = sample_popular_queries(&self.config, &mut rng);
        let query_page = upstream_page(page, self.config.page_coalesce);

        let pools = aggregate(
            self.source.as_ref(),
            &seeds,
            &popular_queries,
            query_page,
            params,
        )
        .await;

        // Only short-form candidates qualify, whichever source they came from.
        let popular: Vec<Candidate> = pools.popular.into_iter().filter(Candidate::is_short).collect();
        let personalized: Vec<Candidate> = pools
            .personalized
            .into_iter()
            .filter(Candidate::is_short)
            .collect();

        let mut seen = initial_seen(signals, session_seen, true);
        let blocks = BlockList::from_signals(signals);
        let negatives = NegativeProfile::from_counts(signals.negative_keywords.clone());
        let subscribed_ids = subscribed_ids(signals);

        let popular = self.filter(popular, &mut seen, &blocks, &negatives, params);
        let personalized = self.filter(personalized, &mut seen, &blocks, &negatives, params);

        let ranked_popular = rank(
            popular,
            &profile,
            true,
            &negatives,
            &subscribed_ids,
            &self.config.weights,
            &mut rng,
        );
        let ranked_personalized = rank(
            personalized,
            &profile,
            false,
            &negatives,
            &subscribed_ids,
            &self.config.weights,
            &mut rng,
        );

        let batch = mix::mix(
            &ranked_popular,
            &ranked_personalized,
            params.target_total,
            params.popular_ratio,
            params.min_score_popular,
            params.min_score_personalized,
            &mut rng,
        );

        info!(
            target: TARGET_RANKING,
            "Shorts feed page {}: {} candidates",
            page,
            batch.len()
        );

        batch
    }

    fn filter(
        &self,
        candidates: Vec<Candidate>,
        seen: &mut HashSet<String>,
        blocks: &BlockList,
        negatives: &NegativeProfile,
        params: &FeedParams,
    ) -> Vec<Candidate> {
        filter_candidates(
            candidates,
            seen,
            blocks,
            negatives,
            params.negative_threshold,
            params.require_japanese,
        )
    }
}

/// Seeds the seen set from hidden videos, the caller's session ids, and
/// (for the shorts feed) the shorts history itself.
fn initial_seen(
    signals: &RankingSignals,
    session_seen: &[String],
    include_shorts_history: bool,
) -> HashSet<String> {
    let mut seen: HashSet<String> = signals.hidden_videos.iter().map(|v| v.id.clone()).collect();
    seen.extend(session_seen.iter().cloned());
    if include_shorts_history {
        seen.extend(signals.shorts_history.iter().map(|v| v.id.clone()));
    }
    seen
}

fn subscribed_ids(signals: &RankingSignals) -> HashSet<String> {
    signals.subscriptions.iter().map(|s| s.id.clone()).collect()
}

fn partition_short(candidates: Vec<Candidate>) -> (Vec<Candidate>, Vec<Candidate>) {
    let mut videos = Vec::new();
    let mut shorts = Vec::new();
    for candidate in candidates {
        if candidate.is_short() {
            shorts.push(candidate);
        } else {
            videos.push(candidate);
        }
    }
    (videos, shorts)
}
