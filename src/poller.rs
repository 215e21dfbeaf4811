//! Periodic fetch → filter → dedup loop.
//!
//! The poller owns the feed list (with its conditional-request state) and the
//! set of item ids already surfaced. New matches are sent over an mpsc
//! channel to whoever displays them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{mpsc, Notify};
use tokio::time::interval;

use crate::app::AppContext;
use crate::domain::{Feed, Item};
use crate::trigger::{filter, first_match, ActiveTrigger};

/// Default poll interval in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 120;

/// Poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval_secs: u64,
    /// Whether to poll immediately on start
    pub poll_on_start: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            poll_on_start: true,
        }
    }
}

/// Longest accepted poll interval, one year.
pub const MAX_INTERVAL_SECS: u64 = 365 * 86400;

/// Parse interval string like "1h", "30m", "6h", "1d"
pub fn parse_interval(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    let (count, unit, scale) = if let Some(hours) = s.strip_suffix('h') {
        (hours, "hours", 3600)
    } else if let Some(minutes) = s.strip_suffix('m') {
        (minutes, "minutes", 60)
    } else if let Some(days) = s.strip_suffix('d') {
        (days, "days", 86400)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, "seconds", 1)
    } else {
        let secs = s
            .parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '2m', '1h', '1d'", s))?;
        return check_interval(secs, &s);
    };

    let secs = count
        .parse::<u64>()
        .map_err(|_| format!("Invalid {}: {}", unit, count))?
        .checked_mul(scale)
        .ok_or_else(|| format!("Interval too large: {}", s))?;
    check_interval(secs, &s)
}

fn check_interval(secs: u64, s: &str) -> Result<u64, String> {
    if secs == 0 {
        return Err("Interval must be greater than zero".to_string());
    }
    if secs > MAX_INTERVAL_SECS {
        return Err(format!("Interval too large: {}", s));
    }
    Ok(secs)
}

/// Format interval for display
pub fn format_interval(secs: u64) -> String {
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Ids of items already surfaced during this process lifetime.
#[derive(Debug, Default)]
pub struct ShownSet {
    ids: HashSet<String>,
}

impl ShownSet {
    /// Record `id`; returns false when it was already shown.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A newly surfaced item and the first active trigger that fired for it.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub item: Item,
    pub trigger: String,
}

/// Outcome of one poll cycle.
#[derive(Debug, Default)]
pub struct PollReport {
    /// Matching items not shown before, in feed order.
    pub matches: Vec<Match>,
    /// Items fetched across all feeds.
    pub fetched: usize,
    /// Feeds that failed to fetch or parse.
    pub errors: usize,
}

/// Cloneable handle that stops a running [`Poller`].
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopHandle {
    fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Poller runner
pub struct Poller {
    ctx: Arc<AppContext>,
    config: PollerConfig,
    triggers: Vec<ActiveTrigger>,
    feeds: Vec<Feed>,
    shown: ShownSet,
    stop: StopHandle,
}

impl Poller {
    pub fn new(ctx: Arc<AppContext>, triggers: Vec<ActiveTrigger>, config: PollerConfig) -> Self {
        let feeds = ctx.config.feeds.iter().cloned().map(Feed::new).collect();
        Self {
            ctx,
            config,
            triggers,
            feeds,
            shown: ShownSet::default(),
            stop: StopHandle::new(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    pub fn shown(&self) -> &ShownSet {
        &self.shown
    }

    /// Fetch every feed once and return the matches not shown before.
    pub async fn poll_once(&mut self) -> PollReport {
        let mut report = PollReport::default();

        let results = self
            .ctx
            .parallel_fetcher
            .fetch_all(&self.feeds, &self.ctx.normalizer)
            .await;

        for (url, result) in results {
            match result {
                Ok(fetched) => {
                    if let Some(update) = fetched.update {
                        if let Some(feed) = self.feeds.iter_mut().find(|f| f.url == url) {
                            feed.apply(update);
                        }
                    }

                    report.fetched += fetched.items.len();
                    for item in filter(&fetched.items, &self.triggers) {
                        if self.shown.insert(&item.id) {
                            let trigger = first_match(item, &self.triggers)
                                .map(|t| t.name().to_string())
                                .unwrap_or_default();
                            report.matches.push(Match {
                                item: item.clone(),
                                trigger,
                            });
                        }
                    }
                }
                Err(e) => {
                    report.errors += 1;
                    tracing::warn!("Error updating {}: {}", url, e);
                }
            }
        }

        report
    }

    /// Run the poller until stopped or until the receiving side of `tx` is
    /// dropped.
    pub async fn run(mut self, tx: mpsc::Sender<Match>) {
        tracing::info!(
            "Polling {} feeds with {} active triggers (interval: {})",
            self.feeds.len(),
            self.triggers.len(),
            format_interval(self.config.interval_secs)
        );

        if self.config.poll_on_start && !self.cycle(&tx).await {
            return;
        }

        let mut timer = interval(Duration::from_secs(self.config.interval_secs));
        timer.tick().await; // Skip the first immediate tick

        while self.stop.is_running() {
            tokio::select! {
                _ = timer.tick() => {}
                _ = self.stop.notify.notified() => {}
                _ = tx.closed() => break,
            }

            if !self.stop.is_running() {
                break;
            }

            if !self.cycle(&tx).await {
                break;
            }
        }

        tracing::info!("Poller shutting down");
    }

    /// One poll plus delivery; false once nobody is listening.
    async fn cycle(&mut self, tx: &mpsc::Sender<Match>) -> bool {
        let start = Utc::now();
        tracing::debug!("Polling...");
        let report = self.poll_once().await;

        let elapsed = Utc::now().signed_duration_since(start);
        tracing::info!(
            "Poll complete: {} items, {} new matches, {} errors ({:.1}s)",
            report.fetched,
            report.matches.len(),
            report.errors,
            elapsed.num_milliseconds() as f64 / 1000.0
        );

        for found in report.matches {
            if tx.send(found).await.is_err() {
                return false;
            }
        }
        true
    }
}

/// Stop the poller on SIGINT/SIGTERM.
pub fn stop_on_signal(handle: StopHandle) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = sigterm.recv() => {},
                        _ = tokio::signal::ctrl_c() => {},
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to set up SIGTERM handler: {}", e);
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }

        tracing::info!("Shutdown signal received");
        handle.stop();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetcher::parallel::tests::{rss, MockFetcher};
    use crate::trigger::load_triggers;

    const FEED_A: &str = "https://a.example/rss";
    const FEED_B: &str = "https://b.example/rss";

    fn context(mock: MockFetcher) -> Arc<AppContext> {
        let config = Config {
            feeds: vec![FEED_A.to_string(), FEED_B.to_string()],
            ..Config::default()
        };
        Arc::new(AppContext::with_fetcher(config, Arc::new(mock)))
    }

    fn triggers() -> Vec<ActiveTrigger> {
        load_triggers("net TITLE network\nrust TITLE rust\nADD net rust").unwrap()
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1h").unwrap(), 3600);
        assert_eq!(parse_interval("30m").unwrap(), 1800);
        assert_eq!(parse_interval("1d").unwrap(), 86400);
        assert_eq!(parse_interval("60s").unwrap(), 60);
        assert_eq!(parse_interval("120").unwrap(), 120);
        assert_eq!(parse_interval(" 2M ").unwrap(), 120);
        assert!(parse_interval("invalid").is_err());
        assert!(parse_interval("0s").is_err());
        assert_eq!(parse_interval("365d").unwrap(), MAX_INTERVAL_SECS);
    }

    #[test]
    fn test_parse_interval_rejects_oversized_values() {
        for input in ["6000000000000000h", "400d", "18446744073709551615"] {
            let err = parse_interval(input).unwrap_err();
            assert!(err.starts_with("Interval too large"), "{input}: {err}");
        }
        assert!(parse_interval("99999999999999999999999s")
            .unwrap_err()
            .starts_with("Invalid seconds"));
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(3600), "1h");
        assert_eq!(format_interval(120), "2m");
        assert_eq!(format_interval(86400), "1d");
        assert_eq!(format_interval(90), "90s");
        assert_eq!(format_interval(7200), "2h");
    }

    #[test]
    fn test_shown_set() {
        let mut shown = ShownSet::default();
        assert!(shown.is_empty());
        assert!(shown.insert("a"));
        assert!(!shown.insert("a"));
        assert!(shown.contains("a"));
        assert_eq!(shown.len(), 1);
    }

    #[tokio::test]
    async fn test_poll_once_filters_and_counts_errors() {
        let mock = MockFetcher::with(&[(
            FEED_A,
            rss(&[
                ("1", "A network story"),
                ("2", "Gardening"),
                ("3", "Rust in production"),
            ]),
        )]);
        let mut poller = Poller::new(context(mock), triggers(), PollerConfig::default());

        let report = poller.poll_once().await;

        let titles: Vec<&str> = report.matches.iter().map(|m| m.item.title.as_str()).collect();
        assert_eq!(titles, vec!["A network story", "Rust in production"]);
        let names: Vec<&str> = report.matches.iter().map(|m| m.trigger.as_str()).collect();
        assert_eq!(names, vec!["net", "rust"]);
        assert_eq!(report.fetched, 3);
        assert_eq!(report.errors, 1);
        assert_eq!(poller.shown().len(), 2);
        assert_eq!(poller.feeds()[0].title.as_deref(), Some("Mock"));
        assert_eq!(poller.feeds()[0].etag.as_deref(), Some("\"fresh\""));
    }

    #[tokio::test]
    async fn test_second_poll_surfaces_nothing_new() {
        let body = rss(&[("1", "A network story")]);
        let mock = MockFetcher::with(&[(FEED_A, body.clone()), (FEED_B, body)]);
        let mut poller = Poller::new(context(mock), triggers(), PollerConfig::default());

        // Same entry id under two feed URLs hashes to two distinct items.
        assert_eq!(poller.poll_once().await.matches.len(), 2);
        assert!(poller.poll_once().await.matches.is_empty());
    }

    #[tokio::test]
    async fn test_shown_set_survives_changed_content() {
        let mock = Arc::new(MockFetcher::with(&[(FEED_A, rss(&[("1", "network")]))]));
        let config = Config {
            feeds: vec![FEED_A.to_string()],
            ..Config::default()
        };
        let ctx = Arc::new(AppContext::with_fetcher(config, mock.clone()));
        let mut poller = Poller::new(ctx, triggers(), PollerConfig::default());

        assert_eq!(poller.poll_once().await.matches.len(), 1);

        // Force a full refetch with one old and one new matching entry.
        poller.feeds[0].etag = None;
        mock.set(FEED_A, rss(&[("1", "network"), ("2", "rust")]));
        let report = poller.poll_once().await;
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].item.title, "rust");
    }

    #[tokio::test]
    async fn test_run_delivers_matches_and_stops() {
        let mock = MockFetcher::with(&[(FEED_A, rss(&[("1", "network"), ("2", "other")]))]);
        let poller = Poller::new(
            context(mock),
            triggers(),
            PollerConfig {
                interval_secs: 3600,
                poll_on_start: true,
            },
        );
        let stop = poller.stop_handle();
        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(poller.run(tx));

        let found = rx.recv().await.unwrap();
        assert_eq!(found.item.title, "network");
        assert_eq!(found.trigger, "net");

        stop.stop();
        task.await.unwrap();
        assert!(!stop.is_running());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_run_ends_when_receiver_dropped() {
        let mock = MockFetcher::with(&[(FEED_A, rss(&[("1", "network")]))]);
        let poller = Poller::new(
            context(mock),
            triggers(),
            PollerConfig {
                interval_secs: 3600,
                poll_on_start: false,
            },
        );
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        poller.run(tx).await;
    }
}
