//! Configuration management for feedwatch.
//!
//! Configuration is read from `~/.config/feedwatch/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created
//! together with a sample trigger file.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::poller::parse_interval;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feeds: Vec<String>,
    pub triggers: PathBuf,
    pub poll: PollConfig,
    pub fetch: FetchConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval: String,
    pub poll_on_start: bool,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: vec!["http://export.arxiv.org/rss/cs".to_string()],
            triggers: PathBuf::from("triggers.txt"),
            poll: PollConfig::default(),
            fetch: FetchConfig::default(),
            base_dir: None,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: "2m".to_string(),
            poll_on_start: true,
            workers: 10,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("feedwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl PollConfig {
    pub fn interval_secs(&self) -> Result<u64, ConfigError> {
        parse_interval(&self.interval).map_err(ConfigError::InvalidInterval)
    }
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let base_dir = path.parent().map(Path::to_path_buf);

        if !path.exists() {
            Self::create_default_config(path)?;
            let config = Self {
                base_dir,
                ..Self::default()
            };
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.base_dir = base_dir;
        config.validate()?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/feedwatch/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("feedwatch").join("config.toml"))
    }

    /// Check the values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for feed in &self.feeds {
            url::Url::parse(feed).map_err(|e| ConfigError::InvalidFeedUrl {
                url: feed.clone(),
                source: e,
            })?;
        }
        self.poll.interval_secs()?;
        Ok(())
    }

    /// The trigger file, with relative paths resolved against the config
    /// directory.
    pub fn triggers_path(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) if self.triggers.is_relative() => dir.join(&self.triggers),
            _ => self.triggers.clone(),
        }
    }

    /// Create a default config file with comments, plus a sample trigger
    /// file next to it when none exists.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        write_file(path, Self::default_config_content())?;

        if let Some(parent) = path.parent() {
            let triggers = parent.join("triggers.txt");
            if !triggers.exists() {
                write_file(&triggers, Self::default_triggers_content())?;
            }
        }

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> &'static str {
        r##"# feedwatch configuration

# Feeds to poll
feeds = ["http://export.arxiv.org/rss/cs"]

# Trigger definitions; relative paths are resolved against this directory
triggers = "triggers.txt"

[poll]
# How often to poll, e.g. "30s", "2m", "1h", "1d"
interval = "2m"

# Poll once immediately on start
poll_on_start = true

# Maximum feeds fetched at the same time
workers = 10

[fetch]
# Request timeout in seconds
timeout_secs = 10

user_agent = "feedwatch/0.1.0"
"##
    }

    fn default_triggers_content() -> &'static str {
        r##"# Trigger definitions, one per line:
#
#   <name> TITLE <word>
#   <name> SUBJECT <word>
#   <name> SUMMARY <word>
#   <name> PHRASE <word> [<word> ...]
#   <name> NOT <name>
#   <name> AND <name> <name>
#   <name> OR <name> <name>
#   ADD <name> [<name> ...]
#
# Names must be defined before they are used.

t1 TITLE network
t2 SUBJECT computing
t3 PHRASE deep learning
t4 OR t2 t3

ADD t1 t4
"##
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    file.write_all(content.as_bytes())
        .map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid feed URL {url}: {source}")]
    InvalidFeedUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Invalid poll interval: {0}")]
    InvalidInterval(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::load_triggers;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(content).expect("Default config should be valid TOML");

        assert_eq!(config.feeds, vec!["http://export.arxiv.org/rss/cs"]);
        assert_eq!(config.poll.interval_secs().unwrap(), 120);
        assert_eq!(config.fetch.timeout_secs, 10);
        config.validate().unwrap();
    }

    #[test]
    fn test_default_triggers_parse() {
        let active = load_triggers(Config::default_triggers_content()).unwrap();
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[poll]
interval = "30s"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.poll.interval_secs().unwrap(), 30);
        assert_eq!(config.poll.workers, 10);
        assert_eq!(config.triggers, PathBuf::from("triggers.txt"));
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.feeds.len(), 1);
        assert!(config.poll.poll_on_start);
    }

    #[test]
    fn test_invalid_feed_url() {
        let config: Config = toml::from_str(r#"feeds = ["not a url"]"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFeedUrl { .. })
        ));
    }

    #[test]
    fn test_invalid_interval() {
        let config: Config = toml::from_str("[poll]\ninterval = \"soon\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInterval(_))
        ));

        let config: Config =
            toml::from_str("[poll]\ninterval = \"6000000000000000h\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_load_from_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedwatch").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert!(dir.path().join("feedwatch").join("triggers.txt").exists());
        assert_eq!(
            config.triggers_path(),
            dir.path().join("feedwatch").join("triggers.txt")
        );

        // Second load reads the file that was just written.
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.feeds, config.feeds);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "feeds = [").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_absolute_triggers_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let triggers = dir.path().join("elsewhere").join("rules.txt");
        fs::write(
            &path,
            format!("triggers = {:?}", triggers.to_string_lossy()),
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.triggers_path(), triggers);
    }
}
