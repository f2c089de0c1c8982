//! Wire-format payloads from the upstream proxy API.
//!
//! The upstream is permissive about which fields it populates, so every
//! field is optional here and a raw item that cannot produce a usable
//! candidate is dropped on its own, never the whole batch.

use serde::Deserialize;

use crate::types::{parse_duration, Candidate};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchResponse {
    pub videos: Vec<RawVideo>,
    pub shorts: Vec<RawVideo>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawTrendingResponse {
    pub videos: Vec<RawVideo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawVideo {
    pub id: Option<String>,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(rename = "channelName")]
    pub channel_name: Option<String>,
    pub author: Option<RawAuthor>,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    #[serde(rename = "isoDuration")]
    pub iso_duration: Option<String>,
    pub views: Option<String>,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: Option<String>,
    #[serde(rename = "isLive")]
    pub is_live: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawAuthor {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl RawVideo {
    /// Maps a raw item to a candidate. An item without an identifier or a
    /// title is unusable and maps to `None`.
    pub fn into_candidate(self) -> Option<Candidate> {
        let id = self
            .id
            .or(self.video_id)
            .filter(|s| !s.trim().is_empty())?;
        let title = self.title.filter(|s| !s.trim().is_empty())?;

        let (author_id, author_name) = match self.author {
            Some(author) => (author.id, author.name),
            None => (None, None),
        };
        let channel_id = self.channel_id.or(author_id).unwrap_or_default();
        let channel_name = self.channel_name.or(author_name).unwrap_or_default();

        let duration_seconds = parse_duration(
            self.iso_duration.as_deref().unwrap_or(""),
            self.duration.as_deref().unwrap_or(""),
        );

        Some(Candidate {
            id,
            title,
            channel_id,
            channel_name,
            thumbnail_url: self.thumbnail_url.unwrap_or_default(),
            duration_seconds,
            views: self.views.unwrap_or_default(),
            uploaded_at: self.uploaded_at.unwrap_or_default(),
            is_live: self.is_live.unwrap_or(false),
        })
    }
}

/// Maps a batch, silently dropping the unusable items.
pub fn map_videos(raw: Vec<RawVideo>) -> Vec<Candidate> {
    raw.into_iter().filter_map(RawVideo::into_candidate).collect()
}
