use chrono::{DateTime, Utc};

/// A subscribed feed and its conditional-request state.
///
/// Lives only in memory for the lifetime of the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub url: String,
    pub title: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl Feed {
    pub fn new(url: String) -> Self {
        Self {
            url,
            title: None,
            etag: None,
            last_modified: None,
            last_fetched_at: None,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedUpdate {
    pub title: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl Feed {
    /// Apply the metadata from a successful fetch.
    ///
    /// The title is only replaced when the new fetch supplied one.
    pub fn apply(&mut self, update: FeedUpdate) {
        if update.title.is_some() {
            self.title = update.title;
        }
        self.etag = update.etag;
        self.last_modified = update.last_modified;
        self.last_fetched_at = update.last_fetched_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_falls_back_to_url() {
        let feed = Feed::new("https://example.com/feed.xml".into());
        assert_eq!(feed.display_title(), "https://example.com/feed.xml");
    }

    #[test]
    fn test_apply_keeps_title_when_missing() {
        let mut feed = Feed::new("https://example.com/feed.xml".into());
        feed.apply(FeedUpdate {
            title: Some("Example".into()),
            etag: Some("\"abc\"".into()),
            ..FeedUpdate::default()
        });
        feed.apply(FeedUpdate {
            etag: Some("\"def\"".into()),
            ..FeedUpdate::default()
        });
        assert_eq!(feed.display_title(), "Example");
        assert_eq!(feed.etag.as_deref(), Some("\"def\""));
    }
}
