//! Network service seam between the view-models and the Data API client.

use async_trait::async_trait;

use crate::models::{Channel, Playlist, PlaylistItem, Video};
use crate::{GoogleAPIRequest, YouTubeDataV3Client, YouTubeError};

/// The four read-only lookups the player needs.
///
/// View-models depend on this trait rather than on `YouTubeDataV3Client`, so
/// tests can hand them a mock with canned results.
#[async_trait]
pub trait YouTubeNetworkService: Send + Sync {
    /// Channels matching `channel_id` (zero or one in practice).
    async fn get_channels(&self, channel_id: &str) -> Result<Vec<Channel>, YouTubeError>;

    /// Up to `max` playlists owned by the channel.
    async fn get_playlists(&self, channel_id: &str, max: u32) -> Result<Vec<Playlist>, YouTubeError>;

    /// Up to `max` items of the playlist, in playlist order.
    async fn get_playlist_items(&self, playlist_id: &str, max: u32) -> Result<Vec<PlaylistItem>, YouTubeError>;

    /// Statistics for the video.
    async fn get_videos(&self, video_id: &str) -> Result<Vec<Video>, YouTubeError>;
}

/// Production service backed by the Data API with a fixed API key.
pub struct YouTubeService {
    client: YouTubeDataV3Client,
    api_key: String,
}

impl YouTubeService {
    pub fn new(client: YouTubeDataV3Client, api_key: impl Into<String>) -> Self {
        YouTubeService {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl YouTubeNetworkService for YouTubeService {
    async fn get_channels(&self, channel_id: &str) -> Result<Vec<Channel>, YouTubeError> {
        let channels = self.client
            .list_channels(channel_id)
            .with_key(&self.api_key)
            .send()
            .await?;
        tracing::debug!(channel_id, count = channels.len(), "channels fetched");
        Ok(channels)
    }

    async fn get_playlists(&self, channel_id: &str, max: u32) -> Result<Vec<Playlist>, YouTubeError> {
        let playlists = self.client
            .list_playlists(channel_id, max)
            .with_key(&self.api_key)
            .send()
            .await?;
        tracing::debug!(channel_id, count = playlists.len(), "playlists fetched");
        Ok(playlists)
    }

    async fn get_playlist_items(&self, playlist_id: &str, max: u32) -> Result<Vec<PlaylistItem>, YouTubeError> {
        let response = self.client
            .list_playlist_items(playlist_id, max, None)
            .with_key(&self.api_key)
            .send()
            .await?;
        tracing::debug!(playlist_id, count = response.items.len(), total = response.total_results, "playlist items fetched");
        Ok(response.items)
    }

    async fn get_videos(&self, video_id: &str) -> Result<Vec<Video>, YouTubeError> {
        let videos = self.client
            .list_videos(vec![video_id.to_string()])
            .with_key(&self.api_key)
            .send()
            .await?;
        tracing::debug!(video_id, count = videos.len(), "videos fetched");
        Ok(videos)
    }
}
