//! Shared data types: candidates, signal snapshots, and feed results.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Candidates at or below this duration are classified as short-form.
pub const SHORT_MAX_SECONDS: u32 = 60;

/// Title marker that classifies a candidate as short-form regardless of duration.
pub const SHORTS_MARKER: &str = "#shorts";

/// A content item eligible for inclusion in a ranked feed.
///
/// Immutable once mapped from the upstream payload; the ranking pipeline
/// only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub duration_seconds: u32,
    #[serde(default)]
    pub views: String,
    #[serde(default)]
    pub uploaded_at: String,
    #[serde(default)]
    pub is_live: bool,
}

impl Candidate {
    /// Short-form classification: duration within the shorts limit, or the
    /// shorts marker in the title.
    pub fn is_short(&self) -> bool {
        (self.duration_seconds > 0 && self.duration_seconds <= SHORT_MAX_SECONDS)
            || self.title.to_lowercase().contains(SHORTS_MARKER)
    }

    /// Combined title and channel text used for keyword blocking.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.channel_name)
    }
}

/// Parses a duration in seconds from an ISO-8601-like string (`PT1H2M3S`)
/// or, failing that, from clock text (`1:02:03`). Returns 0 when neither
/// form is usable.
pub fn parse_duration(iso: &str, text: &str) -> u32 {
    if let Some(rest) = iso.strip_prefix("PT") {
        let mut total: u32 = 0;
        let mut digits = String::new();
        let mut valid = false;
        for c in rest.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else {
                let value: u32 = digits.parse().unwrap_or(0);
                digits.clear();
                match c {
                    'H' => total += value * 3600,
                    'M' => total += value * 60,
                    'S' => total += value,
                    _ => continue,
                }
                valid = true;
            }
        }
        if valid && total > 0 {
            return total;
        }
    }

    let parts: Vec<u32> = text
        .split(':')
        .map(|p| p.trim().parse().unwrap_or(0))
        .collect();
    match parts.len() {
        3 => parts[0] * 3600 + parts[1] * 60 + parts[2],
        2 => parts[0] * 60 + parts[1],
        1 => parts[0],
        _ => 0,
    }
}

/// A watched item as recorded in the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub channel_name: String,
}

/// A subscribed channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
}

/// An explicitly banned channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedChannel {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A dismissed item; its title and channel feed the negative profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiddenVideo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_name: String,
}

/// Read-only snapshot of every user signal a ranking invocation consumes.
///
/// The engine never reaches into ambient storage; callers assemble this
/// from their stores and pass it in whole. History lists are
/// most-recent-first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSignals {
    pub search_history: Vec<String>,
    pub watch_history: Vec<HistoryEntry>,
    pub shorts_history: Vec<HistoryEntry>,
    pub subscriptions: Vec<Subscription>,
    pub blocked_keywords: Vec<String>,
    pub blocked_channels: Vec<BlockedChannel>,
    pub hidden_videos: Vec<HiddenVideo>,
    pub negative_keywords: HashMap<String, u32>,
}

/// Result of a home-feed invocation: a video list plus a shorts row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeFeed {
    pub videos: Vec<Candidate>,
    pub shorts: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(duration_seconds: u32, title: &str) -> Candidate {
        Candidate {
            id: "v1".to_string(),
            title: title.to_string(),
            channel_id: String::new(),
            channel_name: String::new(),
            thumbnail_url: String::new(),
            duration_seconds,
            views: String::new(),
            uploaded_at: String::new(),
            is_live: false,
        }
    }

    #[test]
    fn test_parse_iso_duration() {
        assert_eq!(parse_duration("PT1H2M3S", ""), 3723);
        assert_eq!(parse_duration("PT45S", ""), 45);
        assert_eq!(parse_duration("PT10M", ""), 600);
    }

    #[test]
    fn test_parse_clock_duration() {
        assert_eq!(parse_duration("", "1:02:03"), 3723);
        assert_eq!(parse_duration("", "4:05"), 245);
        assert_eq!(parse_duration("", "59"), 59);
    }

    #[test]
    fn test_iso_duration_preferred_over_text() {
        assert_eq!(parse_duration("PT2M", "59:59"), 120);
        // A zero-valued ISO duration falls through to the text form.
        assert_eq!(parse_duration("PT0S", "1:30"), 90);
    }

    #[test]
    fn test_unparseable_duration_is_zero() {
        assert_eq!(parse_duration("", ""), 0);
        assert_eq!(parse_duration("garbage", "also garbage"), 0);
    }

    #[test]
    fn test_short_classification() {
        assert!(candidate(45, "猫の動画").is_short());
        assert!(!candidate(61, "猫の動画").is_short());
        // Unknown duration alone is not short...
        assert!(!candidate(0, "猫の動画").is_short());
        // ...unless the title carries the marker.
        assert!(candidate(0, "猫 #Shorts").is_short());
    }
}
