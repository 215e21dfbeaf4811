use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::trigger::TriggerError;

#[derive(Error, Debug)]
pub enum FeedwatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trigger configuration error: {0}")]
    Trigger(#[from] TriggerError),

    #[error("Failed to read trigger file {path}: {source}")]
    TriggerFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid trigger file {path}: {source}")]
    InvalidTriggerFile {
        path: PathBuf,
        source: TriggerError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FeedwatchError>;
