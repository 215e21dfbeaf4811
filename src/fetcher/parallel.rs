use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::app::{FeedwatchError, Result};
use crate::domain::{Feed, FeedUpdate, Item};
use crate::fetcher::{FetchResult, Fetcher};
use crate::normalizer::Normalizer;

pub const DEFAULT_WORKERS: usize = 10;

/// What one feed produced during a fetch round.
#[derive(Debug)]
pub struct Fetched {
    /// `None` when the server answered 304.
    pub update: Option<FeedUpdate>,
    pub items: Vec<Item>,
}

pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Fetch and normalize every feed, at most `workers` at a time.
    ///
    /// Results come back in the order of `feeds`, keyed by URL. One feed
    /// failing never affects the others.
    pub async fn fetch_all(
        &self,
        feeds: &[Feed],
        normalizer: &Normalizer,
    ) -> Vec<(String, Result<Fetched>)> {
        let mut handles = Vec::new();

        for feed in feeds {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let normalizer = normalizer.clone();
            let feed = feed.clone();

            let handle = tokio::spawn(async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => fetch_single_feed(&fetcher, &feed, &normalizer).await,
                    Err(e) => Err(FeedwatchError::Other(format!("Worker pool closed: {}", e))),
                };
                (feed.url, result)
            });

            handles.push(handle);
        }

        let mut results = Vec::new();
        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        results
    }
}

async fn fetch_single_feed(
    fetcher: &Arc<dyn Fetcher>,
    feed: &Feed,
    normalizer: &Normalizer,
) -> Result<Fetched> {
    let result = fetcher
        .fetch(
            &feed.url,
            feed.etag.as_deref(),
            feed.last_modified.as_deref(),
        )
        .await?;

    match result {
        FetchResult::NotModified => {
            tracing::debug!("Feed {} not modified", feed.url);
            Ok(Fetched {
                update: None,
                items: Vec::new(),
            })
        }
        FetchResult::Content {
            body,
            etag,
            last_modified,
        } => {
            let (meta, items) = normalizer.normalize(&feed.url, &body)?;
            tracing::debug!("Fetched {} items from {}", items.len(), feed.url);

            let update = FeedUpdate {
                title: meta.title,
                etag,
                last_modified,
                last_fetched_at: Some(Utc::now()),
            };

            Ok(Fetched {
                update: Some(update),
                items,
            })
        }
    }
}
