//! # feedwatch
//!
//! Polls RSS/Atom feeds and surfaces the items that match user-defined
//! triggers.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → Trigger filter → Poller (dedup) → stdout / TUI
//! ```
//!
//! The trigger engine is the pure core: [`load_triggers`] turns a trigger
//! file into an ordered list of active triggers and [`filter`] selects the
//! items for which at least one of them fires. Everything else is I/O around
//! it.
//!
//! ## Trigger file
//!
//! ```text
//! t1 TITLE network
//! t2 SUBJECT computing
//! t3 PHRASE deep learning
//! t4 OR t2 t3
//! ADD t1 t4
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Validate triggers
//! feedwatch check
//!
//! # Fetch once and print matches
//! feedwatch filter https://export.arxiv.org/rss/cs
//!
//! # Keep polling
//! feedwatch watch --interval 2m
//!
//! # Terminal UI
//! feedwatch tui
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// normalizer and configuration.
pub mod app;

/// Command-line interface using clap.
///
/// - `check` - Validate a trigger file
/// - `filter [SOURCE...]` - Fetch once and print matches
/// - `watch` - Poll and print new matches
/// - `tui` - Poll and show matches in the terminal UI
pub mod cli;

/// Configuration loaded from `~/.config/feedwatch/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Item`](domain::Item): One feed entry, decoded to plain text
/// - [`Feed`](domain::Feed): A polled feed and its conditional-request state
pub mod domain;

/// HTTP fetching with conditional request support.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Feed parsing and normalization into plain-text [`Item`](domain::Item)s.
pub mod normalizer;

/// Interval-driven fetch, filter and dedup loop.
pub mod poller;

/// Trigger evaluation engine and its configuration language.
pub mod trigger;

/// Terminal user interface listing matched items.
pub mod tui;

pub use domain::Item;
pub use trigger::{filter, load_triggers, ActiveTrigger, Evaluate, Trigger, TriggerError};
