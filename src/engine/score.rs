//! Candidate relevance scoring.
//!
//! The score is a pure ranking signal combining a source-type bonus,
//! profile similarity, a subscription boost, the negative-profile penalty,
//! and a small jitter for diversity. Only relative order and the per-pool
//! cutoffs matter downstream.

use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::ScoreWeights;
use crate::keywords::candidate_keywords;
use crate::profile::{NegativeProfile, UserProfile};
use crate::types::Candidate;

/// A candidate with its computed relevance score.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

/// Scores one candidate against the user profile.
pub fn score_candidate(
    candidate: &Candidate,
    profile: &UserProfile,
    from_popular_source: bool,
    negatives: &NegativeProfile,
    subscribed_ids: &HashSet<String>,
    weights: &ScoreWeights,
    rng: &mut impl Rng,
) -> f64 {
    let mut score = 0.0;

    if from_popular_source {
        score += weights.popular_source_bonus;
    }

    let keywords = candidate_keywords(candidate);
    score += similarity(&keywords, profile) * weights.similarity_scale;

    if !candidate.channel_id.is_empty() && subscribed_ids.contains(&candidate.channel_id) {
        score += weights.subscription_bonus;
    }

    score -= negatives.weight_for(&keywords) * weights.negative_penalty_scale;

    if weights.jitter_max > 0.0 {
        score += rng.random_range(0.0..weights.jitter_max);
    }

    score
}

/// Dot product of the candidate's keywords (weight 1 per distinct keyword)
/// against the profile vector, normalized by the profile magnitude and the
/// square root of the candidate's keyword count. The square root penalizes
/// generic candidates whose many keywords dilute the match.
fn similarity(keywords: &HashSet<String>, profile: &UserProfile) -> f64 {
    if profile.magnitude <= 0.0 || keywords.is_empty() {
        return 0.0;
    }
    let dot: f64 = keywords.iter().map(|k| profile.vector.weight(k)).sum();
    dot / (profile.magnitude * (keywords.len() as f64).sqrt())
}

/// Scores a whole pool and returns it ranked best-first.
pub fn rank(
    pool: Vec<Candidate>,
    profile: &UserProfile,
    from_popular_source: bool,
    negatives: &NegativeProfile,
    subscribed_ids: &HashSet<String>,
    weights: &ScoreWeights,
    rng: &mut impl Rng,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = pool
        .into_iter()
        .map(|candidate| {
            let score = score_candidate(
                &candidate,
                profile,
                from_popular_source,
                negatives,
                subscribed_ids,
                weights,
                rng,
            );
            RankedCandidate { candidate, score }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileWeights;
    use crate::profile::build_profile;
    use crate::types::{HistoryEntry, Subscription};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidate(id: &str, title: &str, channel_id: &str, channel_name: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: title.to_string(),
            channel_id: channel_id.to_string(),
            channel_name: channel_name.to_string(),
            thumbnail_url: String::new(),
            duration_seconds: 300,
            views: String::new(),
            uploaded_at: String::new(),
            is_live: false,
        }
    }

    fn no_jitter() -> ScoreWeights {
        ScoreWeights {
            jitter_max: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_popular_source_bonus() {
        let profile = UserProfile::default();
        let weights = no_jitter();
        let mut rng = StdRng::seed_from_u64(1);
        let c = candidate("a", "ニュース速報", "UC1", "報道局");

        let popular = score_candidate(
            &c,
            &profile,
            true,
            &NegativeProfile::default(),
            &HashSet::new(),
            &weights,
            &mut rng,
        );
        let personalized = score_candidate(
            &c,
            &profile,
            false,
            &NegativeProfile::default(),
            &HashSet::new(),
            &weights,
            &mut rng,
        );
        assert_eq!(popular - personalized, weights.popular_source_bonus);
    }

    #[test]
    fn test_subscription_bonus() {
        let profile = UserProfile::default();
        let weights = no_jitter();
        let mut rng = StdRng::seed_from_u64(1);
        let subscribed: HashSet<String> = ["UC1".to_string()].into_iter().collect();
        let c = candidate("a", "新作レビュー", "UC1", "レビュー部");

        let with_sub = score_candidate(
            &c,
            &profile,
            false,
            &NegativeProfile::default(),
            &subscribed,
            &weights,
            &mut rng,
        );
        let without = score_candidate(
            &c,
            &profile,
            false,
            &NegativeProfile::default(),
            &HashSet::new(),
            &weights,
            &mut rng,
        );
        assert_eq!(with_sub - without, weights.subscription_bonus);
    }

    #[test]
    fn test_similarity_rewards_profile_overlap() {
        let history = vec![HistoryEntry {
            id: "h1".to_string(),
            title: "ゲーム実況まとめ".to_string(),
            channel_name: "実況団".to_string(),
        }];
        let subs = vec![Subscription {
            id: "UC9".to_string(),
            name: "ゲーム部".to_string(),
        }];
        let profile = build_profile(&subs, &history, &ProfileWeights::default());
        let weights = no_jitter();
        let mut rng = StdRng::seed_from_u64(1);

        let matching = candidate("a", "ゲーム実況 新シリーズ", "UC5", "別の実況団");
        let unrelated = candidate("b", "編み物講座", "UC6", "手芸部屋");

        let score_match = score_candidate(
            &matching,
            &profile,
            false,
            &NegativeProfile::default(),
            &HashSet::new(),
            &weights,
            &mut rng,
        );
        let score_unrelated = score_candidate(
            &unrelated,
            &profile,
            false,
            &NegativeProfile::default(),
            &HashSet::new(),
            &weights,
            &mut rng,
        );
        assert!(score_match > score_unrelated);
        assert_eq!(score_unrelated, 0.0);
    }

    #[test]
    fn test_negative_penalty() {
        let profile = UserProfile::default();
        let weights = no_jitter();
        let mut rng = StdRng::seed_from_u64(1);
        let mut negatives = NegativeProfile::default();
        negatives.record_dismissal("ホラー", "");

        let c = candidate("a", "ホラー特集", "UC1", "映画部");
        let score = score_candidate(
            &c,
            &profile,
            false,
            &negatives,
            &HashSet::new(),
            &weights,
            &mut rng,
        );
        assert_eq!(score, -weights.negative_penalty_scale);
    }

    #[test]
    fn test_rank_orders_best_first() {
        let history = vec![HistoryEntry {
            id: "h1".to_string(),
            title: "ゲーム実況".to_string(),
            channel_name: "実況団".to_string(),
        }];
        let profile = build_profile(&[], &history, &ProfileWeights::default());
        let weights = no_jitter();
        let mut rng = StdRng::seed_from_u64(1);

        let pool = vec![
            candidate("far", "編み物講座", "UC1", "手芸部屋"),
            candidate("near", "ゲーム実況スペシャル", "UC2", "実況団"),
        ];
        let ranked = rank(
            pool,
            &profile,
            false,
            &NegativeProfile::default(),
            &HashSet::new(),
            &weights,
            &mut rng,
        );
        assert_eq!(ranked[0].candidate.id, "near");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_empty_profile_similarity_is_zero() {
        let keywords: HashSet<String> = ["ゲーム".to_string()].into_iter().collect();
        assert_eq!(similarity(&keywords, &UserProfile::default()), 0.0);
        let profile = build_profile(
            &[Subscription {
                id: "UC1".to_string(),
                name: "ゲーム部".to_string(),
            }],
            &[],
            &ProfileWeights::default(),
        );
        assert_eq!(similarity(&HashSet::new(), &profile), 0.0);
    }
}
