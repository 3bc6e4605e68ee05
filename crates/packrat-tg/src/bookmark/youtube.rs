use crate::prelude::*;
use crate::{http, Result};
use serde::Deserialize;
use url::Url;

const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
}

pub(crate) struct Client {
    http: http::Client,
}

impl Client {
    pub(crate) fn new(http: http::Client) -> Self {
        Self { http }
    }

    /// Fetches the video title via the keyless oEmbed endpoint, which is
    /// the same thing the share dialogs use.
    pub(crate) async fn video_title(&self, video_url: &Url) -> Result<String> {
        let mut url: Url = OEMBED_ENDPOINT.parse().fatal_ctx(|| "Bad oembed endpoint")?;

        url.query_pairs_mut()
            .append_pair("url", video_url.as_str())
            .append_pair("format", "json");

        let response: OembedResponse = self.http.get(url).read_json().await?;

        Ok(response.title)
    }
}
