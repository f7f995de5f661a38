//! Home screen view-model: loads the configured channels with their
//! playlists, builds the screen sections and hands queues to the player.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::models::{Channel, Playlist, PlaylistItem, Video};
use crate::service::YouTubeNetworkService;
use crate::YouTubeError;

/// One row group of the home screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSection {
    pub title: String,
    pub items: Vec<CellModel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellModel {
    pub title: String,
    pub kind: CellKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// Paged carousel over every loaded channel.
    PageControl(Vec<Channel>),
    Playlist(Playlist),
}

pub struct HomeViewModel {
    service: Arc<dyn YouTubeNetworkService>,
    channel_ids: Vec<String>,
    playlists_per_channel: u32,
    items_per_playlist: u32,
    page_interval: Duration,

    pub channels: Vec<Channel>,
    pub error_message: Option<String>,
    pub selected_channel: Option<Channel>,
    pub current_playlist_items: Vec<PlaylistItem>,
    pub current_track_index: usize,
    is_loading: bool,
    sections: Vec<ResourceSection>,

    is_player_open: Arc<AtomicBool>,
    pages_counter: Arc<AtomicUsize>,
    timer: Option<JoinHandle<()>>,
}

impl HomeViewModel {
    pub fn new(service: Arc<dyn YouTubeNetworkService>, config: &Config) -> Self {
        HomeViewModel {
            service,
            channel_ids: config.channel_ids.clone(),
            playlists_per_channel: config.playlists_per_channel,
            items_per_playlist: config.items_per_playlist,
            page_interval: config.page_interval,
            channels: Vec::new(),
            error_message: None,
            selected_channel: None,
            current_playlist_items: Vec::new(),
            current_track_index: 0,
            is_loading: false,
            sections: Vec::new(),
            is_player_open: Arc::new(AtomicBool::new(false)),
            pages_counter: Arc::new(AtomicUsize::new(0)),
            timer: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn sections(&self) -> &[ResourceSection] {
        &self.sections
    }

    pub fn is_player_open(&self) -> bool {
        self.is_player_open.load(Ordering::SeqCst)
    }

    /// Kept in sync with the player sheet; the page timer only runs while this is false.
    pub fn set_player_open(&self, open: bool) {
        self.is_player_open.store(open, Ordering::SeqCst);
    }

    pub fn pages_counter(&self) -> usize {
        self.pages_counter.load(Ordering::SeqCst)
    }

    pub fn current_item(&self) -> Option<&PlaylistItem> {
        self.current_playlist_items.get(self.current_track_index)
    }

    /// Runs the full fetch chain: channel, its playlists, their items, and
    /// the view count of every item.
    ///
    /// A channel lookup that fails or comes back empty skips that channel.
    /// Failures further down are recorded in `error_message` and treated as
    /// empty results so the rest of the chain still loads.
    pub async fn load_channels(&mut self) {
        self.is_loading = true;
        self.error_message = None;

        let mut loaded_channels = Vec::with_capacity(self.channel_ids.len());

        for id in self.channel_ids.clone() {
            let channels = match self.service.get_channels(&id).await {
                Ok(channels) => channels,
                Err(e) => {
                    tracing::warn!(channel_id = %id, "channel lookup failed: {}", e);
                    Vec::new()
                }
            };
            let Some(mut channel) = channels.into_iter().next() else {
                tracing::debug!(channel_id = %id, "no channel returned, skipping");
                continue;
            };

            let playlists = self.get_playlists(&id).await;
            let mut updated_playlists = Vec::with_capacity(playlists.len());

            for mut playlist in playlists {
                let items = self.get_playlist_items(&playlist.id).await;
                let mut items_with_view_count = Vec::with_capacity(items.len());

                for mut item in items {
                    let videos = self.get_videos(item.video_id()).await;
                    if let Some(video) = videos.into_iter().next() {
                        item.snippet.view_count = Some(video.statistics.view_count);
                    }
                    items_with_view_count.push(item);
                }

                playlist.playlist_items = Some(items_with_view_count);
                updated_playlists.push(playlist);
            }

            channel.playlists = Some(updated_playlists);
            loaded_channels.push(channel);
        }

        tracing::info!(count = loaded_channels.len(), "channels loaded");
        self.channels = loaded_channels;
        self.sections = self.create_sections(0);
        self.is_loading = false;
    }

    pub fn update_data(&mut self, channel_index: usize) {
        self.sections = self.create_sections(channel_index);
    }

    pub fn section_title(&self, section_index: usize) -> &str {
        self.sections
            .get(section_index)
            .map(|s| s.title.as_str())
            .unwrap_or("")
    }

    /// Queues every item of every playlist of `channel` and opens the player on the first.
    pub fn select_channel(&mut self, channel: Channel) {
        self.current_playlist_items = joined_playlist_items(channel.playlists.as_deref());
        self.selected_channel = Some(channel);
        self.current_track_index = 0;
        self.set_player_open(true);
    }

    /// Opens the player on `items`, starting at `start_at` clamped into range.
    /// Does nothing for an empty list.
    pub fn open_player(&mut self, items: Vec<PlaylistItem>, start_at: usize) {
        if items.is_empty() {
            return;
        }
        self.current_track_index = start_at.min(items.len() - 1);
        self.current_playlist_items = items;
        self.set_player_open(true);
    }

    /// Starts advancing the carousel page every page interval. Restarts a running timer.
    pub fn start_timer(&mut self) {
        self.stop_timer();

        let interval = self.page_interval;
        let is_player_open = Arc::clone(&self.is_player_open);
        let pages_counter = Arc::clone(&self.pages_counter);

        self.timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                if !is_player_open.load(Ordering::SeqCst) {
                    let page = pages_counter.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::trace!(page, "carousel advanced");
                }
            }
        }));
    }

    pub fn stop_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    async fn get_playlists(&mut self, channel_id: &str) -> Vec<Playlist> {
        let result = self.service.get_playlists(channel_id, self.playlists_per_channel).await;
        self.recover(result)
    }

    async fn get_playlist_items(&mut self, playlist_id: &str) -> Vec<PlaylistItem> {
        let result = self.service.get_playlist_items(playlist_id, self.items_per_playlist).await;
        self.recover(result)
    }

    async fn get_videos(&mut self, video_id: &str) -> Vec<Video> {
        let result = self.service.get_videos(video_id).await;
        self.recover(result)
    }

    fn recover<T>(&mut self, result: Result<Vec<T>, YouTubeError>) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("fetch failed: {}", e);
                self.error_message = Some(e.to_string());
                Vec::new()
            }
        }
    }

    fn create_sections(&self, channel_index: usize) -> Vec<ResourceSection> {
        let Some(channel) = self.channels.get(channel_index) else {
            return Vec::new();
        };

        let mut sections = Vec::with_capacity(1 + channel.playlists.as_ref().map_or(0, Vec::len));

        sections.push(ResourceSection {
            title: String::new(),
            items: vec![CellModel {
                title: String::new(),
                kind: CellKind::PageControl(self.channels.clone()),
            }],
        });

        for playlist in channel.playlists.iter().flatten() {
            sections.push(ResourceSection {
                title: playlist.snippet.title.clone(),
                items: vec![CellModel {
                    title: String::new(),
                    kind: CellKind::Playlist(playlist.clone()),
                }],
            });
        }

        sections
    }
}

impl Drop for HomeViewModel {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

fn joined_playlist_items(playlists: Option<&[Playlist]>) -> Vec<PlaylistItem> {
    playlists
        .unwrap_or_default()
        .iter()
        .filter_map(|p| p.playlist_items.as_ref())
        .flatten()
        .cloned()
        .collect()
}
