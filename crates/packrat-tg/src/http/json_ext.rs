use super::HttpClientError;
use crate::prelude::*;
use crate::{err, Result};
use async_trait::async_trait;
use easy_ext::ext;
use reqwest_middleware::RequestBuilder;
use serde::de::DeserializeOwned;

#[ext(RequestBuilderJsonExt)]
#[async_trait]
pub(crate) impl RequestBuilder {
    async fn read_json<Res: DeserializeOwned>(self) -> Result<Res> {
        let bytes = self.read_bytes().await?;

        serde_json::from_slice(&bytes).map_err(|err| {
            // Dump the offending payload, otherwise the deserialization
            // error alone is useless for debugging
            match std::str::from_utf8(&bytes) {
                Ok(body) => warn!(%body, "Bad JSON response"),
                Err(utf8_err) => warn!(body = ?bytes, ?utf8_err, "Bad JSON response (not UTF-8)"),
            };
            err!(HttpClientError::UnexpectedResponseJsonShape { source: err })
        })
    }
}
