//! Trigger evaluation engine.
//!
//! A trigger is a boolean predicate over an [`Item`]. Primitive triggers
//! match words or phrases; composite triggers combine earlier triggers with
//! NOT, AND and OR. Composites share their children through [`Arc`], so a
//! named trigger reused by several composites is a single node and the
//! trigger graph is a DAG.
//!
//! The graph is acyclic by construction: [`load_triggers`] only lets a
//! definition reference names defined on earlier lines. Building a cycle by
//! hand is impossible because nodes are immutable once wrapped in an `Arc`.

pub mod filter;
pub mod matcher;
pub mod parser;

use std::fmt;
use std::sync::Arc;

use crate::domain::Item;

pub use filter::{filter, first_match};
pub use matcher::{Field, PhraseMatch, WordMatch};
pub use parser::{load_triggers, TriggerError};

/// The single capability every trigger shares.
pub trait Evaluate {
    fn evaluate(&self, item: &Item) -> bool;
}

impl<T: Evaluate + ?Sized> Evaluate for &T {
    fn evaluate(&self, item: &Item) -> bool {
        (**self).evaluate(item)
    }
}

impl<T: Evaluate + ?Sized> Evaluate for Arc<T> {
    fn evaluate(&self, item: &Item) -> bool {
        (**self).evaluate(item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Word(WordMatch),
    Phrase(PhraseMatch),
    Not(Arc<Trigger>),
    And(Arc<Trigger>, Arc<Trigger>),
    Or(Arc<Trigger>, Arc<Trigger>),
}

impl Trigger {
    pub fn word(field: Field, word: &str) -> Self {
        Trigger::Word(WordMatch::new(field, word))
    }

    pub fn title(word: &str) -> Self {
        Self::word(Field::Title, word)
    }

    pub fn subject(word: &str) -> Self {
        Self::word(Field::Subject, word)
    }

    pub fn summary(word: &str) -> Self {
        Self::word(Field::Summary, word)
    }

    pub fn phrase(phrase: impl Into<String>) -> Self {
        Trigger::Phrase(PhraseMatch::new(phrase))
    }

    pub fn not(inner: Arc<Trigger>) -> Self {
        Trigger::Not(inner)
    }

    pub fn and(left: Arc<Trigger>, right: Arc<Trigger>) -> Self {
        Trigger::And(left, right)
    }

    pub fn or(left: Arc<Trigger>, right: Arc<Trigger>) -> Self {
        Trigger::Or(left, right)
    }
}

impl Evaluate for Trigger {
    fn evaluate(&self, item: &Item) -> bool {
        match self {
            Trigger::Word(word) => word.matches(item),
            Trigger::Phrase(phrase) => phrase.matches(item),
            Trigger::Not(inner) => !inner.evaluate(item),
            Trigger::And(left, right) => left.evaluate(item) && right.evaluate(item),
            Trigger::Or(left, right) => left.evaluate(item) || right.evaluate(item),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Word(word) => write!(f, "{}:{}", word.field(), word.word()),
            Trigger::Phrase(phrase) => write!(f, "\"{}\"", phrase.phrase()),
            Trigger::Not(inner) => write!(f, "NOT({})", inner),
            Trigger::And(left, right) => write!(f, "AND({}, {})", left, right),
            Trigger::Or(left, right) => write!(f, "OR({}, {})", left, right),
        }
    }
}

/// A trigger selected by an `ADD` directive, with the name it was added as.
#[derive(Debug, Clone)]
pub struct ActiveTrigger {
    name: String,
    trigger: Arc<Trigger>,
}

impl ActiveTrigger {
    pub fn new(name: impl Into<String>, trigger: Arc<Trigger>) -> Self {
        Self {
            name: name.into(),
            trigger,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> &Arc<Trigger> {
        &self.trigger
    }
}

impl Evaluate for ActiveTrigger {
    fn evaluate(&self, item: &Item) -> bool {
        self.trigger.evaluate(item)
    }
}

impl fmt::Display for ActiveTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.trigger)
    }
}
