use crate::{GoogleAPIRequestFields, HttpsClient, YouTubeError};
use crate::models::{Channel, ItemsWrapper};
use crate::utils::{get_json, push_query};

pub struct ListChannelsRequest<'a> {
    pub client: &'a HttpsClient,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub channel_id: String,
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for ListChannelsRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

impl<'a> ListChannelsRequest<'a> {
    /// Fetches branding and statistics for one channel. An unknown id yields an empty list.
    pub async fn send(self) -> Result<Vec<Channel>, YouTubeError> {
        let mut url = format!("{}/youtube/v3/channels?part=brandingSettings%2Cstatistics", self.base_url);
        push_query(&mut url, "id", &self.channel_id);

        let wrapper: ItemsWrapper<Channel> = get_json(self.client, url, &self.fields).await?;

        Ok(wrapper.items)
    }
}
