use crate::{GoogleAPIRequestFields, HttpsClient, YouTubeError};
use crate::models::PlaylistItem;
use crate::utils::{get_json, push_query};
use serde::Deserialize;

pub struct ListPlaylistItemsRequest<'a> {
    pub client: &'a HttpsClient,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub playlist_id: String,
    pub max_results: u32,
    pub page_token: Option<String>,
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for ListPlaylistItemsRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    #[serde(rename = "pageInfo")]
    page_info: Option<PageInfo>,
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(rename = "totalResults")]
    total_results: u32,
}

#[derive(Debug)]
pub struct ListPlaylistItemsResponse {
    pub next_page_token: Option<String>,
    pub total_results: u32,
    pub items: Vec<PlaylistItem>,
}

impl<'a> ListPlaylistItemsRequest<'a> {
    pub async fn send(self) -> Result<ListPlaylistItemsResponse, YouTubeError> {
        let mut url = format!("{}/youtube/v3/playlistItems?part=snippet", self.base_url);
        push_query(&mut url, "playlistId", &self.playlist_id);
        push_query(&mut url, "maxResults", &self.max_results.to_string());

        if let Some(page_token) = &self.page_token {
            push_query(&mut url, "pageToken", page_token);
        }

        let api_response: ApiResponse = get_json(self.client, url, &self.fields).await?;

        let total_results = api_response
            .page_info
            .map(|p| p.total_results)
            .unwrap_or(api_response.items.len() as u32);

        Ok(ListPlaylistItemsResponse {
            next_page_token: api_response.next_page_token,
            total_results,
            items: api_response.items,
        })
    }
}
