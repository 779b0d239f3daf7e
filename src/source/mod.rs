//! YouTube metadata and caption fetching for Kanal.
//!
//! Everything here shells out to yt-dlp; nothing in this module touches the
//! transform pipeline beyond producing files and metadata for it.

mod youtube;

pub use youtube::YoutubeSource;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about a YouTube channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel ID.
    pub id: String,
    /// Channel name.
    pub name: String,
    /// Canonical channel URL.
    pub url: String,
}

/// Metadata about a single video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Video ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description (if available).
    pub description: Option<String>,
    /// Duration in seconds (if known).
    pub duration_seconds: Option<u32>,
    /// Publication date (if available).
    pub published_at: Option<DateTime<Utc>>,
    /// Thumbnail URL (if available).
    pub thumbnail_url: Option<String>,
    /// Channel the video belongs to (if known).
    pub channel_id: Option<String>,
}
