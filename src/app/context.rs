use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::app::error::{FeedwatchError, Result};
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::poller::PollerConfig;
use crate::trigger::{load_triggers, ActiveTrigger};

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher>,
    pub parallel_fetcher: ParallelFetcher,
    pub normalizer: Normalizer,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let parallel_fetcher = ParallelFetcher::with_workers(fetcher.clone(), config.poll.workers);
        let normalizer = Normalizer::new();

        Self {
            config,
            fetcher,
            parallel_fetcher,
            normalizer,
        }
    }

    /// Load the trigger file named by the configuration.
    pub fn load_triggers(&self) -> Result<Vec<ActiveTrigger>> {
        load_trigger_file(&self.config.triggers_path())
    }

    pub fn poller_config(&self) -> Result<PollerConfig> {
        Ok(PollerConfig {
            interval_secs: self.config.poll.interval_secs()?,
            poll_on_start: self.config.poll.poll_on_start,
        })
    }
}

/// Read and parse a trigger file.
pub fn load_trigger_file(path: &Path) -> Result<Vec<ActiveTrigger>> {
    let content = fs::read_to_string(path).map_err(|e| FeedwatchError::TriggerFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!("Loading triggers from {}", path.display());
    load_triggers(&content).map_err(|e| FeedwatchError::InvalidTriggerFile {
        path: path.to_path_buf(),
        source: e,
    })
}
