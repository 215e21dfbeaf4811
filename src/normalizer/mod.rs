use chrono::Utc;
use feed_rs::model::Text;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{FeedwatchError, Result};
use crate::domain::Item;

#[derive(Debug, Clone)]
pub struct FeedMeta {
    pub title: Option<String>,
}

/// Turns RSS/Atom bytes into plain-text [`Item`]s.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, feed_url: &str, body: &[u8]) -> Result<(FeedMeta, Vec<Item>)> {
        let feed = parser::parse(body).map_err(|e| FeedwatchError::FeedParse(e.to_string()))?;

        let meta = FeedMeta {
            title: feed.title.as_ref().map(text_content),
        };

        let items: Vec<Item> = feed
            .entries
            .into_iter()
            .map(|entry| {
                let link = entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_default();
                let entry_id = if entry.id.is_empty() {
                    link.clone()
                } else {
                    entry.id.clone()
                };

                let mut item = Item::new(feed_url, &entry_id).with_link(link);
                item.title = entry.title.as_ref().map(text_content).unwrap_or_default();
                item.subject = entry
                    .categories
                    .first()
                    .map(|c| decode_text(&c.term))
                    .unwrap_or_default();
                item.summary = entry
                    .summary
                    .as_ref()
                    .map(text_content)
                    .unwrap_or_default();
                item.published_at = entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.with_timezone(&Utc));

                item
            })
            .collect();

        tracing::debug!("Normalized {} items from {}", items.len(), feed_url);
        Ok((meta, items))
    }
}

/// Plain text of a feed text construct. Markup is only stripped when the
/// feed declares the text as HTML; a plain-text title such as "n < m" keeps
/// its angle brackets.
fn text_content(text: &Text) -> String {
    if text.content_type.subty() == "html" {
        plain_text(&text.content)
    } else {
        decode_text(&text.content)
    }
}

/// Collapse whitespace runs to single spaces and decode entities, leaving
/// everything else as written.
pub fn decode_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    decode_html_entities(&collapsed).into_owned()
}

/// Strip markup, collapse whitespace runs to single spaces, then decode
/// entities.
pub fn plain_text(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    let mut last_was_space = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => {
                if c.is_whitespace() {
                    if !last_was_space {
                        result.push(' ');
                        last_was_space = true;
                    }
                } else {
                    result.push(c);
                    last_was_space = false;
                }
            }
            _ => {}
        }
    }

    decode_html_entities(result.trim()).to_string()
}
