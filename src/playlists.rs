use crate::{GoogleAPIRequestFields, HttpsClient, YouTubeError};
use crate::models::{ItemsWrapper, Playlist};
use crate::utils::{get_json, push_query};

pub struct ListPlaylistsRequest<'a> {
    pub client: &'a HttpsClient,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub channel_id: String,
    pub max_results: u32,
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for ListPlaylistsRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

impl<'a> ListPlaylistsRequest<'a> {
    pub async fn send(self) -> Result<Vec<Playlist>, YouTubeError> {
        let mut url = format!("{}/youtube/v3/playlists?part=snippet", self.base_url);
        push_query(&mut url, "channelId", &self.channel_id);
        push_query(&mut url, "maxResults", &self.max_results.to_string());

        let wrapper: ItemsWrapper<Playlist> = get_json(self.client, url, &self.fields).await?;

        Ok(wrapper.items)
    }
}
