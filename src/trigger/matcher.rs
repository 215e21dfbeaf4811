//! Primitive word and phrase matchers.

use std::fmt;

use crate::domain::Item;

/// Which text field of an [`Item`] a word matcher inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Subject,
    Summary,
}

impl Field {
    pub fn text<'a>(&self, item: &'a Item) -> &'a str {
        match self {
            Field::Title => &item.title,
            Field::Subject => &item.subject,
            Field::Summary => &item.summary,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Subject => "subject",
            Field::Summary => "summary",
        };
        f.write_str(name)
    }
}

/// Case-insensitive whole-word match against a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMatch {
    field: Field,
    word: String,
}

impl WordMatch {
    pub fn new(field: Field, word: &str) -> Self {
        Self {
            field,
            word: word.to_lowercase(),
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// The target word, already lower-cased.
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.field
            .text(item)
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| c.is_ascii_punctuation()))
            .any(|token| token.to_lowercase() == self.word)
    }
}

/// Case-sensitive substring match against title, subject and summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatch {
    phrase: String,
}

impl PhraseMatch {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn matches(&self, item: &Item) -> bool {
        [Field::Title, Field::Subject, Field::Summary]
            .iter()
            .any(|field| field.text(item).contains(self.phrase.as_str()))
    }
}
