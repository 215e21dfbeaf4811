use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use reqwest::{Client, Response, StatusCode};

use crate::app::Result;
use crate::config::FetchConfig;
use crate::fetcher::{FetchResult, Fetcher};

/// Fetches feeds over HTTP(S) with one pooled client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

/// Conditional request headers for the validators of the last response.
/// Values that are not valid header text are skipped.
fn conditional_headers(etag: Option<&str>, last_modified: Option<&str>) -> HeaderMap {
    [(IF_NONE_MATCH, etag), (IF_MODIFIED_SINCE, last_modified)]
        .into_iter()
        .filter_map(|(name, value)| Some((name, HeaderValue::from_str(value?).ok()?)))
        .collect()
}

fn header_string(response: &Response, name: HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<FetchResult> {
        let response = self
            .client
            .get(url)
            .headers(conditional_headers(etag, last_modified))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            tracing::debug!("{} unchanged since last poll", url);
            return Ok(FetchResult::NotModified);
        }
        response.error_for_status_ref()?;

        let etag = header_string(&response, ETAG);
        let last_modified = header_string(&response, LAST_MODIFIED);
        let body = response.bytes().await?.to_vec();
        tracing::debug!("{}: {} bytes", url, body.len());

        Ok(FetchResult::Content {
            body,
            etag,
            last_modified,
        })
    }
}
