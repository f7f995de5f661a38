use crate::{GoogleAPIRequestFields, HttpsClient, YouTubeError};
use crate::models::{ItemsWrapper, Video};
use crate::utils::{get_json, push_query};

pub struct ListVideosRequest<'a> {
    pub client: &'a HttpsClient,
    pub base_url: &'a str,
    pub fields: GoogleAPIRequestFields<'a>,
    pub video_ids: Vec<String>,
}

impl<'a> AsMut<GoogleAPIRequestFields<'a>> for ListVideosRequest<'a> {
    fn as_mut(&mut self) -> &mut GoogleAPIRequestFields<'a> {
        &mut self.fields
    }
}

impl<'a> ListVideosRequest<'a> {
    /// Fetches view statistics. Ids the API does not know are simply absent from the result.
    pub async fn send(self) -> Result<Vec<Video>, YouTubeError> {
        if self.video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = format!("{}/youtube/v3/videos?part=statistics", self.base_url);
        push_query(&mut url, "id", &self.video_ids.join(","));

        let wrapper: ItemsWrapper<Video> = get_json(self.client, url, &self.fields).await?;

        Ok(wrapper.items)
    }
}
