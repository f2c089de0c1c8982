//! Tunable parameters for profile building, aggregation, scoring, and mixing.
//!
//! All of the constants that shape a feed live here with their shipped
//! defaults. None of them are invariants; callers may override any of them
//! through [`RankingConfig`].

use tokio::time::Duration;

/// Weights applied while accumulating a user's keyword vector.
#[derive(Debug, Clone)]
pub struct ProfileWeights {
    /// Weight for keywords from subscribed channel names (non-decaying).
    pub subscription_weight: f64,
    /// Weight for keywords from a watched item's title, before decay.
    pub title_weight: f64,
    /// Weight for keywords from a watched item's channel name, before decay.
    pub channel_weight: f64,
    /// How many history items (most-recent-first) contribute.
    pub history_window: usize,
    /// Recency decay constant: contribution is scaled by `exp(-rank / decay)`.
    pub recency_decay: f64,
}

impl Default for ProfileWeights {
    fn default() -> Self {
        Self {
            subscription_weight: 5.0,
            title_weight: 3.0,
            channel_weight: 4.0,
            history_window: 30,
            recency_decay: 10.0,
        }
    }
}

/// Constants combined into a candidate's relevance score.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    /// Flat bonus for candidates that arrived from a popular/trending source.
    pub popular_source_bonus: f64,
    /// Multiplier applied to the profile-similarity term.
    pub similarity_scale: f64,
    /// Flat bonus when the candidate's channel is subscribed.
    pub subscription_bonus: f64,
    /// Multiplier applied to the summed negative-keyword weight.
    pub negative_penalty_scale: f64,
    /// Upper bound of the uniform random jitter; 0 disables jitter.
    pub jitter_max: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            popular_source_bonus: 80.0,
            similarity_scale: 100.0,
            subscription_bonus: 50.0,
            negative_penalty_scale: 30.0,
            jitter_max: 20.0,
        }
    }
}

/// Per-feed aggregation, filtering, and mixing parameters.
#[derive(Debug, Clone)]
pub struct FeedParams {
    /// How many candidates the feed aims to return.
    pub target_total: usize,
    /// Fraction of the target drawn from the popular pool.
    pub popular_ratio: f64,
    /// Minimum score for popular-pool candidates to be selectable.
    pub min_score_popular: f64,
    /// Minimum score for personalized-pool candidates to be selectable.
    pub min_score_personalized: f64,
    /// A candidate whose summed negative-keyword weight reaches this is dropped.
    pub negative_threshold: f64,
    /// Reject candidates with no Japanese text in title or channel name.
    pub require_japanese: bool,
    /// Deadline for each upstream search call.
    pub search_timeout: Duration,
    /// Deadline for the upstream trending call.
    pub trending_timeout: Duration,
}

/// Full engine configuration with the shipped defaults.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Parameters for the general video feed.
    pub home: FeedParams,
    /// Parameters for the short-form feed.
    pub shorts: FeedParams,
    /// Size of the shorts row embedded in the home feed.
    pub home_shorts_target: usize,
    pub weights: ScoreWeights,
    pub profile: ProfileWeights,
    /// How many top profile keywords become seed queries.
    pub seed_keyword_count: usize,
    /// How many watch-history titles are sampled for seed queries.
    pub history_seed_count: usize,
    /// The upstream page parameter advances once per this many logical pages.
    pub page_coalesce: u32,
    /// How many popular-shorts queries are sampled per shorts-feed call.
    pub popular_query_count: usize,
    /// Seed queries used when the user has no signal at all.
    pub fallback_topics: Vec<String>,
    /// Query pool for the popular side of the shorts feed.
    pub popular_shorts_queries: Vec<String>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            home: FeedParams {
                target_total: 100,
                popular_ratio: 0.20,
                min_score_popular: -100.0,
                min_score_personalized: -50.0,
                negative_threshold: 2.0,
                require_japanese: false,
                search_timeout: Duration::from_millis(5000),
                trending_timeout: Duration::from_millis(2500),
            },
            shorts: FeedParams {
                target_total: 30,
                popular_ratio: 0.85,
                min_score_popular: -100.0,
                min_score_personalized: -50.0,
                negative_threshold: 2.0,
                require_japanese: true,
                search_timeout: Duration::from_millis(3000),
                trending_timeout: Duration::from_millis(2000),
            },
            home_shorts_target: 20,
            weights: ScoreWeights::default(),
            profile: ProfileWeights::default(),
            seed_keyword_count: 3,
            history_seed_count: 7,
            page_coalesce: 3,
            popular_query_count: 3,
            fallback_topics: vec![
                "Music".to_string(),
                "Gaming".to_string(),
                "Vlog".to_string(),
                "News".to_string(),
                "Technology".to_string(),
            ],
            popular_shorts_queries: vec![
                " #shorts".to_string(),
                "急上昇 #shorts".to_string(),
                "人気 #shorts".to_string(),
                "バズってる #shorts".to_string(),
                "面白い #shorts".to_string(),
                "切り抜き #shorts".to_string(),
                "コント #shorts".to_string(),
                "あるある #shorts".to_string(),
                "雑学 #shorts".to_string(),
                "豆知識 #shorts".to_string(),
                "ライフハック #shorts".to_string(),
                "解説 #shorts".to_string(),
            ],
        }
    }
}
