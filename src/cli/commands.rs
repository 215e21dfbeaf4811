use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::app::{load_trigger_file, AppContext, FeedwatchError, Result};
use crate::domain::Item;
use crate::fetcher::FetchResult;
use crate::poller::{self, format_interval, Match, Poller, PollerConfig};
use crate::trigger::{filter, first_match, ActiveTrigger};

/// Capacity of the poller → display channel.
const MATCH_CHANNEL_SIZE: usize = 256;

pub fn check(path: &Path) -> Result<()> {
    let triggers = load_trigger_file(path)?;

    println!(
        "{}: {} active trigger{}",
        path.display(),
        triggers.len(),
        if triggers.len() == 1 { "" } else { "s" }
    );
    for trigger in &triggers {
        println!("  {}", trigger);
    }

    Ok(())
}

/// Totals from a one-shot `filter` run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub sources: usize,
    pub matched: usize,
    pub errors: usize,
}

/// Fetch each source once and print the items that match.
pub async fn filter_sources(
    ctx: &AppContext,
    triggers: &[ActiveTrigger],
    sources: &[String],
    json: bool,
) -> Result<FilterSummary> {
    let sources: Vec<String> = if sources.is_empty() {
        ctx.config.feeds.clone()
    } else {
        sources.to_vec()
    };

    let mut summary = FilterSummary {
        sources: sources.len(),
        ..FilterSummary::default()
    };

    for source in &sources {
        let items = match load_source(ctx, source).await {
            Ok(items) => items,
            Err(e) => {
                summary.errors += 1;
                eprintln!("  Error reading {}: {}", source, e);
                continue;
            }
        };

        for item in filter(&items, triggers) {
            let trigger = first_match(item, triggers)
                .map(|t| t.name().to_string())
                .unwrap_or_default();
            let found = Match {
                item: item.clone(),
                trigger,
            };
            if json {
                println!("{}", serde_json::to_string(&found)?);
            } else {
                print_match(&found);
            }
            summary.matched += 1;
        }
    }

    if !json {
        println!(
            "{} matching items from {} sources, {} errors",
            summary.matched, summary.sources, summary.errors
        );
    }
    Ok(summary)
}

/// Read a local feed file, or fetch the source as a URL.
async fn load_source(ctx: &AppContext, source: &str) -> Result<Vec<Item>> {
    let path = Path::new(source);
    if path.is_file() {
        let body = std::fs::read(path)?;
        let (_, items) = ctx.normalizer.normalize(source, &body)?;
        return Ok(items);
    }

    let url = url::Url::parse(source)?;
    match ctx.fetcher.fetch(url.as_str(), None, None).await? {
        FetchResult::Content { body, .. } => {
            let (_, items) = ctx.normalizer.normalize(url.as_str(), &body)?;
            Ok(items)
        }
        FetchResult::NotModified => Err(FeedwatchError::Other(format!(
            "unexpected 304 Not Modified from {}",
            url
        ))),
    }
}

/// Poll until interrupted, printing each new match.
pub async fn watch(
    ctx: Arc<AppContext>,
    triggers: Vec<ActiveTrigger>,
    config: PollerConfig,
) -> Result<()> {
    println!(
        "Watching {} feeds every {} (Ctrl-C to stop)",
        ctx.config.feeds.len(),
        format_interval(config.interval_secs)
    );

    let poller = Poller::new(ctx, triggers, config);
    poller::stop_on_signal(poller.stop_handle());

    let (tx, mut rx) = mpsc::channel(MATCH_CHANNEL_SIZE);
    let task = tokio::spawn(poller.run(tx));

    while let Some(found) = rx.recv().await {
        print_match(&found);
    }

    task.await
        .map_err(|e| FeedwatchError::Other(format!("Poller task failed: {}", e)))?;
    Ok(())
}

/// Poll in the background and show matches in the terminal UI.
pub async fn tui(
    ctx: Arc<AppContext>,
    triggers: Vec<ActiveTrigger>,
    config: PollerConfig,
) -> Result<()> {
    let poller = Poller::new(ctx, triggers, config);
    let stop = poller.stop_handle();

    let (tx, rx) = mpsc::channel(MATCH_CHANNEL_SIZE);
    let task = tokio::spawn(poller.run(tx));

    let result = crate::tui::run(rx).await;

    stop.stop();
    task.abort();
    result
}

fn print_match(found: &Match) {
    println!("[{}] {}", found.trigger, found.item.display_title());
    if !found.item.link.is_empty() {
        println!("  {}", found.item.link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetcher::parallel::tests::{rss, MockFetcher};
    use crate::trigger::load_triggers;

    fn context() -> AppContext {
        let mock = MockFetcher::with(&[(
            "https://a.example/rss",
            rss(&[("1", "network news"), ("2", "cooking")]),
        )]);
        AppContext::with_fetcher(Config::default(), Arc::new(mock))
    }

    #[tokio::test]
    async fn test_load_source_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        std::fs::write(&path, rss(&[("1", "local entry")])).unwrap();

        let items = load_source(&context(), &path.to_string_lossy()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "local entry");
    }

    #[tokio::test]
    async fn test_load_source_from_url() {
        let items = load_source(&context(), "https://a.example/rss").await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_load_source_rejects_non_url() {
        let err = load_source(&context(), "no-such-file.xml").await.unwrap_err();
        assert!(matches!(err, FeedwatchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_filter_sources_tolerates_bad_sources() {
        let triggers = load_triggers("t1 TITLE network\nADD t1").unwrap();
        let sources = vec![
            "https://a.example/rss".to_string(),
            "https://missing.example/rss".to_string(),
        ];
        let summary = filter_sources(&context(), &triggers, &sources, true)
            .await
            .unwrap();
        assert_eq!(
            summary,
            FilterSummary {
                sources: 2,
                matched: 1,
                errors: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_filter_sources_defaults_to_configured_feeds() {
        let triggers = load_triggers("t1 TITLE network\nADD t1").unwrap();
        let summary = filter_sources(&context(), &triggers, &[], true)
            .await
            .unwrap();
        // The default config feed is not served by the mock.
        assert_eq!(summary.sources, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.matched, 0);
    }
}
