use async_trait::async_trait;
use thiserror::Error;

/// Player states as reported by the YouTube iframe API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl EmbedState {
    /// Maps the numeric codes of `onStateChange` / `getPlayerState()`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(EmbedState::Unstarted),
            0 => Some(EmbedState::Ended),
            1 => Some(EmbedState::Playing),
            2 => Some(EmbedState::Paused),
            3 => Some(EmbedState::Buffering),
            5 => Some(EmbedState::Cued),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Player is not ready")]
    NotReady,
    #[error("Video unavailable: {0}")]
    Unavailable(String),
    #[error("Player command failed: {0}")]
    Command(String),
}

/// Remote-controlled video player, typically a web embed driven over a
/// script bridge. Every call is asynchronous and may lag behind the
/// commands sent to it, so callers treat reads as eventually consistent.
#[async_trait]
pub trait EmbeddedPlayer: Send + Sync {
    async fn load(&self, video_id: &str) -> Result<(), PlayerError>;

    async fn play(&self) -> Result<(), PlayerError>;

    async fn pause(&self) -> Result<(), PlayerError>;

    /// Seeks to an absolute position in seconds.
    async fn seek(&self, seconds: f64) -> Result<(), PlayerError>;

    /// Volume in percent, 0 to 100.
    async fn set_volume(&self, volume: u8) -> Result<(), PlayerError>;

    async fn current_time(&self) -> Result<f64, PlayerError>;

    /// Duration in seconds; zero until the video metadata is known.
    async fn duration(&self) -> Result<f64, PlayerError>;

    async fn state(&self) -> Result<EmbedState, PlayerError>;
}
