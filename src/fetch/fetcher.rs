use std::collections::HashMap;
use std::time::Duration;

use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, ETAG, IF_NONE_MATCH};

use crate::constants::PKG_VERSION;
use crate::errors::ErrorKind::*;
use crate::errors::FlagError;
use crate::fetch::fetcher::FetchResponse::{Failed, Fetched, NotModified};
use crate::fetch::payload::flags_from_json;

pub const FM_UA_HEADER: &str = "X-FM-UserAgent";
pub const FM_API_KEY_HEADER: &str = "X-FM-Api-Key";
pub const FM_DEV_MODE_HEADER: &str = "X-FM-Dev-Mode-Secret";

#[derive(Debug, PartialEq)]
pub enum FetchResponse {
    Fetched(HashMap<String, bool>, String),
    NotModified,
    Failed(FlagError, bool),
}

pub struct Fetcher {
    base_url: String,
    http_client: reqwest::Client,
}

impl Fetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FlagError> {
        let mut headers = HeaderMap::new();
        let ua = HeaderValue::from_str(format!("insurance-flags/{PKG_VERSION}").as_str())
            .map_err(|err| FlagError::new(HttpClientInitFailure, err.to_string()))?;
        headers.insert(FM_UA_HEADER, ua);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| {
                FlagError::new(
                    HttpClientInitFailure,
                    format!("Failed to initialize the HTTP client. {err}"),
                )
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http_client,
        })
    }

    pub async fn fetch(
        &self,
        namespace: &str,
        api_key: &str,
        dev_mode_secret: Option<&str>,
        etag: &str,
    ) -> FetchResponse {
        let url = format!("{base}/flags/{namespace}", base = self.base_url);
        let mut builder = self
            .http_client
            .get(url)
            .header(FM_API_KEY_HEADER, api_key.to_owned());
        if let Some(secret) = dev_mode_secret {
            builder = builder.header(FM_DEV_MODE_HEADER, secret.to_owned());
        }
        if !etag.is_empty() {
            builder = builder.header(IF_NONE_MATCH, etag.to_owned());
        }

        match builder.send().await {
            Ok(response) => match response.status().as_u16() {
                200 => {
                    debug!("Fetch was successful: new flag configuration fetched");
                    let etag = response
                        .headers()
                        .get(ETAG)
                        .and_then(|header| header.to_str().ok())
                        .unwrap_or("")
                        .to_owned();
                    match response.text().await {
                        Ok(body) => match flags_from_json(body.as_str()) {
                            Ok(payload) => Fetched(payload.flags, etag),
                            Err(parse_error) => {
                                let msg = format!("Fetching flag configuration was successful but the HTTP response content was invalid. {parse_error}");
                                error!(event_id = InvalidHttpResponseContent.as_u16(); "{}", msg);
                                Failed(FlagError::new(InvalidHttpResponseContent, msg), true)
                            }
                        },
                        Err(body_error) => {
                            let msg = format!("Fetching flag configuration was successful but the HTTP response content was invalid. {body_error}");
                            error!(event_id = InvalidHttpResponseContent.as_u16(); "{}", msg);
                            Failed(FlagError::new(InvalidHttpResponseContent, msg), true)
                        }
                    }
                }
                304 => {
                    debug!("Fetch was successful: not modified");
                    NotModified
                }
                code @ (401 | 403 | 404) => {
                    let msg = format!("Your API key seems to be wrong. Status code: {code}");
                    error!(event_id = InvalidApiKey.as_u16(); "{}", msg);
                    Failed(FlagError::new(InvalidApiKey, msg), false)
                }
                code => {
                    let msg = format!("Unexpected HTTP response was received while trying to fetch flag configuration. Status code: {code}");
                    error!(event_id = UnexpectedHttpResponse.as_u16(); "{}", msg);
                    Failed(FlagError::new(UnexpectedHttpResponse, msg), true)
                }
            },
            Err(error) => {
                if error.is_timeout() {
                    let msg = "Request timed out while trying to fetch flag configuration.".to_owned();
                    error!(event_id = HttpRequestTimeout.as_u16(); "{}", msg);
                    Failed(FlagError::new(HttpRequestTimeout, msg), true)
                } else {
                    let msg = format!("Unexpected error occurred while trying to fetch flag configuration. It is most likely due to a local network issue. {error}");
                    error!(event_id = HttpRequestFailure.as_u16(); "{}", msg);
                    Failed(FlagError::new(HttpRequestFailure, msg), true)
                }
            }
        }
    }
}
