//! User taste profiles: weighted keyword vectors built from subscriptions
//! and consumption history, plus the negative profile accumulated from
//! explicit dismissals.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::ProfileWeights;
use crate::keywords::extract_keywords;
use crate::types::{HistoryEntry, Subscription};

/// A weighted bag-of-tokens representation of text. Weights never go
/// negative.
#[derive(Debug, Clone, Default)]
pub struct KeywordVector {
    weights: HashMap<String, f64>,
}

impl KeywordVector {
    /// Adds every keyword of `text` with the given weight.
    pub fn add_text(&mut self, text: &str, weight: f64) {
        if weight <= 0.0 {
            return;
        }
        for keyword in extract_keywords(text) {
            *self.weights.entry(keyword).or_insert(0.0) += weight;
        }
    }

    pub fn weight(&self, keyword: &str) -> f64 {
        self.weights.get(keyword).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Euclidean norm over all accumulated weights.
    pub fn magnitude(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    /// The `k` highest-weight keywords, heaviest first. Ties break on the
    /// keyword itself so the result is deterministic.
    pub fn top_keywords(&self, k: usize) -> Vec<String> {
        let mut entries: Vec<(&String, f64)> =
            self.weights.iter().map(|(k, w)| (k, *w)).collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        entries.into_iter().take(k).map(|(k, _)| k.clone()).collect()
    }
}

/// A keyword vector with its precomputed magnitude, used for the
/// cosine-style similarity term in scoring.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub vector: KeywordVector,
    pub magnitude: f64,
}

/// Builds a user profile from subscriptions and recent history.
///
/// Subscribed channel names contribute at a fixed weight; history items
/// (most-recent-first, capped at the configured window) contribute their
/// title and channel-name keywords scaled by `exp(-rank / decay)`, the
/// channel name weighted above the title.
pub fn build_profile(
    subscriptions: &[Subscription],
    history: &[HistoryEntry],
    weights: &ProfileWeights,
) -> UserProfile {
    let mut vector = KeywordVector::default();

    for subscription in subscriptions {
        vector.add_text(&subscription.name, weights.subscription_weight);
    }

    for (rank, entry) in history.iter().take(weights.history_window).enumerate() {
        let decay = (-(rank as f64) / weights.recency_decay).exp();
        vector.add_text(&entry.title, weights.title_weight * decay);
        vector.add_text(&entry.channel_name, weights.channel_weight * decay);
    }

    let magnitude = vector.magnitude();
    UserProfile { vector, magnitude }
}

/// Accumulated suppression signal from explicit dismissals: keyword to
/// occurrence count. Owned by the preference store; the engine only reads
/// it, but the lifecycle operations live here so every writer agrees on
/// the semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NegativeProfile {
    counts: HashMap<String, u32>,
}

impl NegativeProfile {
    pub fn from_counts(counts: HashMap<String, u32>) -> Self {
        Self { counts }
    }

    /// Increments every keyword of the dismissed item's title and channel.
    pub fn record_dismissal(&mut self, title: &str, channel_name: &str) {
        for keyword in dismissal_keywords(title, channel_name) {
            *self.counts.entry(keyword).or_insert(0) += 1;
        }
    }

    /// Undoes one dismissal: decrements the same keywords, removing entries
    /// that reach zero.
    pub fn retract_dismissal(&mut self, title: &str, channel_name: &str) {
        for keyword in dismissal_keywords(title, channel_name) {
            if let Some(count) = self.counts.get_mut(&keyword) {
                if *count <= 1 {
                    self.counts.remove(&keyword);
                } else {
                    *count -= 1;
                }
            }
        }
    }

    /// Summed weight over the given keywords.
    pub fn weight_for(&self, keywords: &HashSet<String>) -> f64 {
        keywords
            .iter()
            .map(|k| self.counts.get(k).copied().unwrap_or(0) as f64)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }
}

fn dismissal_keywords(title: &str, channel_name: &str) -> HashSet<String> {
    let mut keywords = extract_keywords(title);
    keywords.extend(extract_keywords(channel_name));
    keywords
}
