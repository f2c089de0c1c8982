//! Stratified quota mixing between the popular and personalized pools.
//!
//! Ranking determines inclusion only; the returned feed is shuffled so the
//! caller never sees a visibly tiered list.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use super::score::RankedCandidate;
use crate::types::Candidate;

/// Walks a ranked pool in order, yielding candidates above the cutoff that
/// have not been selected yet.
struct PoolCursor<'a> {
    items: &'a [RankedCandidate],
    index: usize,
    cutoff: f64,
}

impl<'a> PoolCursor<'a> {
    fn new(items: &'a [RankedCandidate], cutoff: f64) -> Self {
        Self {
            items,
            index: 0,
            cutoff,
        }
    }

    fn next_eligible(&mut self, used: &HashSet<String>) -> Option<&'a Candidate> {
        while self.index < self.items.len() {
            let ranked = &self.items[self.index];
            self.index += 1;
            if ranked.score < self.cutoff {
                // Pools are sorted, so everything after is below the cutoff too.
                self.index = self.items.len();
                return None;
            }
            if !used.contains(&ranked.candidate.id) {
                return Some(&ranked.candidate);
            }
        }
        None
    }
}

fn take_up_to(
    cursor: &mut PoolCursor<'_>,
    count: usize,
    used: &mut HashSet<String>,
    selected: &mut Vec<Candidate>,
) -> usize {
    let mut taken = 0;
    while taken < count {
        match cursor.next_eligible(used) {
            Some(candidate) => {
                used.insert(candidate.id.clone());
                selected.push(candidate.clone());
                taken += 1;
            }
            None => break,
        }
    }
    taken
}

/// Selects up to `target_total` candidates: `floor(target_total * popular_ratio)`
/// from the popular pool and the rest from the personalized pool, each pool
/// honoring its score cutoff and skipping cross-pool duplicates. A pool that
/// misses its quota backfills from the other pool's next-ranked items first,
/// then from the remainder of its own pool. The result is shuffled.
pub fn mix(
    ranked_popular: &[RankedCandidate],
    ranked_personalized: &[RankedCandidate],
    target_total: usize,
    popular_ratio: f64,
    min_score_popular: f64,
    min_score_personalized: f64,
    rng: &mut impl Rng,
) -> Vec<Candidate> {
    let ratio = popular_ratio.clamp(0.0, 1.0);
    let target_popular = (target_total as f64 * ratio).floor() as usize;
    let target_personalized = target_total - target_popular;

    let mut popular = PoolCursor::new(ranked_popular, min_score_popular);
    let mut personalized = PoolCursor::new(ranked_personalized, min_score_personalized);

    let mut used = HashSet::new();
    let mut selected = Vec::with_capacity(target_total);

    let taken_popular = take_up_to(&mut popular, target_popular, &mut used, &mut selected);
    take_up_to(
        &mut personalized,
        target_personalized,
        &mut used,
        &mut selected,
    );

    if selected.len() < target_total {
        // The undersupplied pool borrows from the other pool's next-ranked
        // items before falling back to its own remainder.
        let popular_short = taken_popular < target_popular;
        let (first, second) = if popular_short {
            (&mut personalized, &mut popular)
        } else {
            (&mut popular, &mut personalized)
        };
        let missing = target_total - selected.len();
        take_up_to(first, missing, &mut used, &mut selected);
        if selected.len() < target_total {
            let missing = target_total - selected.len();
            take_up_to(second, missing, &mut used, &mut selected);
        }
    }

    selected.shuffle(rng);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ranked(prefix: &str, count: usize, base_score: f64) -> Vec<RankedCandidate> {
        (0..count)
            .map(|i| RankedCandidate {
                candidate: Candidate {
                    id: format!("{}-{}", prefix, i),
                    title: format!("{} {}", prefix, i),
                    channel_id: String::new(),
                    channel_name: String::new(),
                    thumbnail_url: String::new(),
                    duration_seconds: 120,
                    views: String::new(),
                    uploaded_at: String::new(),
                    is_live: false,
                },
                score: base_score - i as f64,
            })
            .collect()
    }

    fn count_prefixed(selected: &[Candidate], prefix: &str) -> usize {
        selected.iter().filter(|c| c.id.starts_with(prefix)).count()
    }

    #[test]
    fn test_quota_exact_when_both_pools_supply() {
        let popular = ranked("pop", 50, 100.0);
        let personalized = ranked("per", 50, 100.0);
        let mut rng = StdRng::seed_from_u64(7);

        let selected = mix(&popular, &personalized, 20, 0.20, -100.0, -50.0, &mut rng);
        assert_eq!(selected.len(), 20);
        assert_eq!(count_prefixed(&selected, "pop"), 4);
        assert_eq!(count_prefixed(&selected, "per"), 16);
    }

    #[test]
    fn test_backfill_from_other_pool() {
        // Personalized supply is two items short of its 16-item quota.
        let popular = ranked("pop", 50, 100.0);
        let personalized = ranked("per", 14, 100.0);
        let mut rng = StdRng::seed_from_u64(7);

        let selected = mix(&popular, &personalized, 20, 0.20, -100.0, -50.0, &mut rng);
        assert_eq!(selected.len(), 20);
        assert_eq!(count_prefixed(&selected, "per"), 14);
        assert_eq!(count_prefixed(&selected, "pop"), 6);
    }

    #[test]
    fn test_cutoff_excludes_low_scores() {
        // Scores run 10, 9, ..., 10 - i; cutoff 6 keeps five items (10..6).
        let popular = ranked("pop", 50, 10.0);
        let personalized: Vec<RankedCandidate> = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);

        let selected = mix(&popular, &personalized, 20, 1.0, 6.0, -50.0, &mut rng);
        assert_eq!(selected.len(), 5);
    }

    #[test]
    fn test_cross_pool_duplicates_skipped() {
        // The personalized pool repeats the popular pool's ids.
        let popular = ranked("same", 10, 100.0);
        let personalized = ranked("same", 10, 100.0);
        let mut rng = StdRng::seed_from_u64(7);

        let selected = mix(&popular, &personalized, 20, 0.5, -100.0, -50.0, &mut rng);
        assert_eq!(selected.len(), 10);
        let ids: HashSet<&str> = selected.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_empty_pools_give_empty_result() {
        let mut rng = StdRng::seed_from_u64(7);
        let selected = mix(&[], &[], 20, 0.2, -100.0, -50.0, &mut rng);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_frozen_seed_gives_stable_order() {
        let popular = ranked("pop", 30, 100.0);
        let personalized = ranked("per", 30, 100.0);

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = mix(&popular, &personalized, 20, 0.2, -100.0, -50.0, &mut rng_a);
        let b = mix(&popular, &personalized, 20, 0.2, -100.0, -50.0, &mut rng_b);
        assert_eq!(a, b);
    }
}
