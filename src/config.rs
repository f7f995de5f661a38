//! Runtime configuration.
//!
//! The API key lives in a small JSON file (`{"apiKey": "..."}`) kept out of
//! version control. Environment variables override both the file and the
//! built-in defaults:
//!
//! | Variable                | Effect                          |
//! |-------------------------|---------------------------------|
//! | `YOUTUBE_PLAYER_CONFIG` | path of the API key file        |
//! | `YOUTUBE_API_KEY`       | API key, takes precedence       |
//! | `YOUTUBE_API_BASE_URL`  | Data API base URL               |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_KEY_FILE: &str = "APIKey.json";

pub const CONFIG_PATH_ENV: &str = "YOUTUBE_PLAYER_CONFIG";
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const BASE_URL_ENV: &str = "YOUTUBE_API_BASE_URL";

/// Channels shown on the home screen, in display order.
pub const DEFAULT_CHANNEL_IDS: [&str; 4] = [
    "UCiMhD4jzUqG-IgPzUmmytRQ",
    "UC5OrDvL9DscpcAstz7JnQGA",
    "UCmvtGezn6LpfUN1QW0aEaTg",
    "UC7fzrpTArAqDHuB3Hbmd_CQ",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing API key: set YOUTUBE_API_KEY or provide APIKey.json")]
    MissingApiKey,
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct KeyFile {
    #[serde(rename = "apiKey")]
    api_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub channel_ids: Vec<String>,
    pub playlists_per_channel: u32,
    pub items_per_playlist: u32,
    /// How often the home carousel advances while the player is closed.
    pub page_interval: Duration,
    /// How often the player view-model polls the embedded player.
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            channel_ids: DEFAULT_CHANNEL_IDS.iter().map(|id| id.to_string()).collect(),
            playlists_per_channel: 2,
            items_per_playlist: 8,
            page_interval: Duration::from_secs(5),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl Config {
    /// Loads from the process environment and the key file it points to.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::load`] with an injectable environment lookup.
    pub fn load_with<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(base_url) = env(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url;
        }

        if let Some(key) = env(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            config.api_key = key;
            return Ok(config);
        }

        let path = env(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE));

        match Self::read_key_file(&path) {
            Ok(key) => {
                config.api_key = key;
                Ok(config)
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("{} not found", path.display());
                Err(ConfigError::MissingApiKey)
            }
            Err(e) => Err(e),
        }
    }

    /// Reads the `apiKey` field of a key file. An empty key counts as missing.
    pub fn read_key_file(path: &Path) -> Result<String, ConfigError> {
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file: KeyFile = serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if file.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(file.api_key)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_channel_ids<I, S>(mut self, channel_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channel_ids = channel_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_page_interval(mut self, interval: Duration) -> Self {
        self.page_interval = interval;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
