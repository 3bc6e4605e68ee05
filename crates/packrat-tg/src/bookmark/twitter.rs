use crate::prelude::*;
use crate::{http, util, Result};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

// Keyless tweet metadata mirror: <https://github.com/dylanpdx/BetterTwitFix>
util::url::def!(vxtwitter_api, "https://api.vxtwitter.com/Twitter/status");

#[serde_as]
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
    Deserialize,
)]
#[serde(transparent)]
pub(crate) struct TweetId(#[serde_as(as = "DisplayFromStr")] u64);

#[derive(Debug, Deserialize)]
pub(crate) struct Tweet {
    pub(crate) text: String,

    #[serde(rename = "user_name")]
    pub(crate) author: String,
}

pub(crate) struct Client {
    http: http::Client,
}

impl Client {
    pub(crate) fn new(http: http::Client) -> Self {
        Self { http }
    }

    pub(crate) async fn get_tweet(&self, id: TweetId) -> Result<Tweet> {
        let url = vxtwitter_api([&id.to_string()]);

        self.http.get(url).read_json().await
    }
}
