//! YouTube Data API v3 `videos.list` integration
//!
//! This module provides:
//! - Response payload types and their conversion to snapshot rows
//! - The `StatsSource` seam the collector fetches through
//! - An HTTP client with a fixed backoff schedule for transient failures

mod client;

pub use client::*;

use crate::error::Result;
use crate::history::{SnapshotDate, SnapshotRow};
use crate::video_id::watch_url;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Anything that can return statistics for a batch of video IDs
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_batch(&self, video_ids: &[String]) -> Result<Vec<VideoItem>>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub snippet: Option<Snippet>,
    /// Counts arrive as decimal strings; kept loose and coerced later
    #[serde(default)]
    pub statistics: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: Option<String>,
}

/// Thumbnail sizes from most to least preferred
pub const THUMBNAIL_PREFERENCE: [&str; 4] = ["maxres", "high", "medium", "default"];

impl Snippet {
    /// Highest-resolution thumbnail URL available
    pub fn best_thumbnail(&self) -> Option<&str> {
        THUMBNAIL_PREFERENCE.iter().find_map(|size| {
            self.thumbnails
                .get(*size)
                .and_then(|t| t.url.as_deref())
                .filter(|url| !url.is_empty())
        })
    }
}

/// Coerce a statistics value (string or number) to a count; zero otherwise
fn count(stats: Option<&HashMap<String, Value>>, key: &str) -> u64 {
    match stats.and_then(|s| s.get(key)) {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

impl VideoItem {
    /// Flatten into a snapshot row for `day`; items without an ID yield nothing
    pub fn into_snapshot(self, day: NaiveDate) -> Option<SnapshotRow> {
        let video_id = self.id.filter(|id| !id.is_empty())?;
        let snippet = self.snippet.unwrap_or_default();
        let stats = self.statistics.as_ref();

        Some(SnapshotRow {
            date: SnapshotDate::Day(day),
            views: count(stats, "viewCount"),
            likes: count(stats, "likeCount"),
            comments: count(stats, "commentCount"),
            thumbnail_url: snippet.best_thumbnail().unwrap_or_default().to_string(),
            title: snippet.title.unwrap_or_default(),
            channel_title: snippet.channel_title.unwrap_or_default(),
            published_at: snippet.published_at.unwrap_or_default(),
            video_url: watch_url(&video_id),
            video_id,
            extra: Vec::new(),
        })
    }
}
