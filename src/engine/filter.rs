//! Candidate filtering and dedup.
//!
//! The reject checks run in a fixed order because only accepted candidates
//! grow the seen set; given a frozen seen set the accept/reject outcome is
//! order-independent.

use std::collections::HashSet;

use crate::keywords::{candidate_keywords, is_japanese_text};
use crate::profile::NegativeProfile;
use crate::types::{Candidate, RankingSignals};

/// Explicit channel and keyword bans, lower-cased once per invocation.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    channel_ids: HashSet<String>,
    keywords: Vec<String>,
}

impl BlockList {
    pub fn from_signals(signals: &RankingSignals) -> Self {
        Self {
            channel_ids: signals
                .blocked_channels
                .iter()
                .map(|c| c.id.to_lowercase())
                .collect(),
            keywords: signals
                .blocked_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn blocks_channel(&self, channel_id: &str) -> bool {
        !channel_id.is_empty() && self.channel_ids.contains(&channel_id.to_lowercase())
    }

    /// `text` must already be lower-cased.
    pub fn blocks_text(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Filters a candidate pool against the seen set, block list, and negative
/// profile; the short-form variant additionally requires Japanese text.
/// Accepted candidates are added to `seen` so later pools in the same
/// invocation dedupe against them.
pub fn filter_candidates(
    candidates: Vec<Candidate>,
    seen: &mut HashSet<String>,
    blocks: &BlockList,
    negatives: &NegativeProfile,
    negative_threshold: f64,
    require_japanese: bool,
) -> Vec<Candidate> {
    let mut accepted = Vec::new();

    for candidate in candidates {
        if seen.contains(&candidate.id) {
            continue;
        }
        if blocks.blocks_channel(&candidate.channel_id) {
            continue;
        }
        let full_text = candidate.full_text().to_lowercase();
        if blocks.blocks_text(&full_text) {
            continue;
        }
        let keywords = candidate_keywords(&candidate);
        if negatives.weight_for(&keywords) >= negative_threshold {
            continue;
        }
        if require_japanese
            && !is_japanese_text(&candidate.title)
            && !is_japanese_text(&candidate.channel_name)
        {
            continue;
        }

        seen.insert(candidate.id.clone());
        accepted.push(candidate);
    }

    accepted
}
