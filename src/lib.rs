use std::error::Error;
use hyper::body::Bytes;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use http_body_util::Empty;
use hyper::StatusCode;
use thiserror::Error;
use native_tls::TlsConnector;
use hyper_util::rt::TokioExecutor;


pub mod config;
pub mod format;
pub mod home;
pub mod models;
pub mod player;
pub mod service;
pub mod utils;
pub mod channels;
pub use channels::ListChannelsRequest;
pub mod playlists;
pub use playlists::ListPlaylistsRequest;
pub mod playlist_items;
pub use playlist_items::ListPlaylistItemsRequest;
pub mod videos;
pub use videos::ListVideosRequest;

pub use config::{Config, ConfigError};
pub use home::HomeViewModel;
pub use player::{EmbeddedPlayer, PlayerError, PlayerViewModel};
pub use service::{YouTubeNetworkService, YouTubeService};

pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(#[from] std::io::Error),
    #[error("TLS error: {0}")]
    TlsError(#[from] native_tls::Error),
}

/// Builds the shared HTTP client. The connector speaks TLS for `https://`
/// base URLs and plain HTTP otherwise.
pub fn initialize_client() -> Result<HttpsClient, ClientError> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let tls = TlsConnector::builder().build()?;

    let https = HttpsConnector::from((http, tls.into()));

    let client = Client::builder(TokioExecutor::new())
        .build::<_, Empty<Bytes>>(https);

    Ok(client)
}

pub struct GoogleAPIRequestFields<'a> {
    pub bearer_token: Option<&'a str>,
    pub key: Option<&'a str>,
    pub referrer: Option<&'a str>,
}

impl<'a> GoogleAPIRequestFields<'a> {
    fn empty() -> Self {
        GoogleAPIRequestFields {
            bearer_token: None,
            key: None,
            referrer: None,
        }
    }
}

pub trait GoogleAPIRequest<'a> {
    fn bearer_token(&mut self) -> &mut Option<&'a str>;

    fn key(&mut self) -> &mut Option<&'a str>;

    fn referrer(&mut self) -> &mut Option<&'a str>;

    fn with_bearer_token(mut self, bearer_token: &'a str) -> Self
    where
        Self: Sized,
    {
        *self.bearer_token() = Some(bearer_token);
        self
    }

    fn with_key(mut self, key: &'a str) -> Self
    where
        Self: Sized,
    {
        *self.key() = Some(key);
        self
    }

    fn with_referrer(mut self, referrer: &'a str) -> Self
    where
        Self: Sized,
    {
        *self.referrer() = Some(referrer);
        self
    }
}

impl<'a, T> GoogleAPIRequest<'a> for T
where
    T: AsMut<GoogleAPIRequestFields<'a>>,
{
    fn bearer_token(&mut self) -> &mut Option<&'a str> {
        &mut self.as_mut().bearer_token
    }

    fn key(&mut self) -> &mut Option<&'a str> {
        &mut self.as_mut().key
    }

    fn referrer(&mut self) -> &mut Option<&'a str> {
        &mut self.as_mut().referrer
    }
}

#[derive(Error, Debug)]
pub enum YouTubeError {
    #[error("Not found")]
    NotFound,
    #[error("Ratelimited")]
    Ratelimited,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Internal server error")]
    InternalServerError,
    #[error("Unknown status code: {0}")]
    UnknownStatusCode(StatusCode),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("HTTP error: {0}")]
    HttpError(#[from] hyper::Error),
    #[error("Legacy HTTP error: {0}")]
    LegacyHttpError(#[from] hyper_util::client::legacy::Error),
    #[error("Other error: {0}")]
    Other(Box<dyn Error + Send + Sync>),
}

/// Read-only client for the four YouTube Data API v3 endpoints the player uses.
///
/// `base_url` includes the scheme, e.g. `https://www.googleapis.com`.
pub struct YouTubeDataV3Client {
    client: HttpsClient,
    base_url: String,
}

impl YouTubeDataV3Client {
    pub fn new(base_url: impl Into<String>, client: HttpsClient) -> Self {
        let base_url: String = base_url.into();
        YouTubeDataV3Client {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn list_channels<'a>(&'a self, channel_id: &str) -> ListChannelsRequest<'a> {
        ListChannelsRequest {
            client: &self.client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields::empty(),
            channel_id: channel_id.to_string(),
        }
    }

    pub fn list_playlists<'a>(&'a self, channel_id: &str, max_results: u32) -> ListPlaylistsRequest<'a> {
        ListPlaylistsRequest {
            client: &self.client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields::empty(),
            channel_id: channel_id.to_string(),
            max_results,
        }
    }

    pub fn list_playlist_items<'a>(&'a self, playlist_id: &str, max_results: u32, page_token: Option<String>) -> ListPlaylistItemsRequest<'a> {
        ListPlaylistItemsRequest {
            client: &self.client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields::empty(),
            playlist_id: playlist_id.to_string(),
            max_results,
            page_token,
        }
    }

    pub fn list_videos<'a>(&'a self, video_ids: Vec<String>) -> ListVideosRequest<'a> {
        ListVideosRequest {
            client: &self.client,
            base_url: &self.base_url,
            fields: GoogleAPIRequestFields::empty(),
            video_ids,
        }
    }
}
