//! Feed retrieval.
//!
//! A [`Fetcher`] only moves bytes; parsing lives in the normalizer. Callers
//! pass back the validators from the previous response so unchanged feeds
//! cost a 304 instead of a full download.

pub mod http_fetcher;
pub mod parallel;

use async_trait::async_trait;

use crate::app::Result;

/// Outcome of fetching one feed.
#[derive(Debug)]
pub enum FetchResult {
    /// The feed body plus the validators to send on the next poll.
    Content {
        body: Vec<u8>,
        etag: Option<String>,
        last_modified: Option<String>,
    },
    /// The feed is unchanged since the validators were issued.
    NotModified,
}

/// Source of raw feed documents, shared across poll tasks.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, sending `etag` and `last_modified` as conditional
    /// request headers when present.
    async fn fetch(
        &self,
        url: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<FetchResult>;
}
