use chrono::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub statistics: ChannelStatistics,
    #[serde(rename = "brandingSettings")]
    pub branding_settings: BrandingSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlists: Option<Vec<Playlist>>,
}

impl Channel {
    pub fn title(&self) -> &str {
        &self.branding_settings.channel.title
    }

    pub fn banner_url(&self) -> Option<&str> {
        self.branding_settings
            .image
            .as_ref()
            .and_then(|i| i.banner_external_url.as_deref())
    }

    /// `None` when the channel hides its subscriber count.
    pub fn subscriber_count(&self) -> Option<u64> {
        self.statistics
            .subscriber_count
            .as_ref()
            .and_then(|c| c.parse::<u64>().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatistics {
    #[serde(rename = "subscriberCount", default)]
    pub subscriber_count: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandingSettings {
    pub channel: ChannelBranding,
    #[serde(default)]
    pub image: Option<ChannelImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelBranding {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelImage {
    #[serde(rename = "bannerExternalUrl", default)]
    pub banner_external_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub snippet: PlaylistSnippet,
    #[serde(rename = "playlistItems", default, skip_serializing_if = "Option::is_none")]
    pub playlist_items: Option<Vec<PlaylistItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSnippet {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    pub snippet: PlaylistItemSnippet,
}

impl PlaylistItem {
    pub fn video_id(&self) -> &str {
        &self.snippet.resource_id.video_id
    }

    /// Parsed view count, present once the item has been enriched with video statistics.
    pub fn view_count(&self) -> Option<u64> {
        self.snippet
            .view_count
            .as_ref()
            .and_then(|c| c.parse::<u64>().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItemSnippet {
    pub title: String,
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceId,
    #[serde(rename = "viewCount", default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<String>,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
    #[serde(rename = "publishedAt", default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl PlaylistItemSnippet {
    pub fn published_timestamp(&self) -> Option<i64> {
        self.published_at
            .as_ref()
            .and_then(|dt| DateTime::parse_from_rfc3339(dt).ok())
            .map(|dt| dt.timestamp())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceId {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// Highest resolution thumbnail the API returned.
    pub fn best(&self) -> Option<&Thumbnail> {
        self.maxres
            .as_ref()
            .or(self.standard.as_ref())
            .or(self.high.as_ref())
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub statistics: VideoStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: String,
}

/// Envelope shared by every list endpoint. A missing `items` key decodes as empty.
#[derive(Debug, Deserialize)]
pub(crate) struct ItemsWrapper<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}
