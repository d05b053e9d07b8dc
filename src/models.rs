//! Data models for feed entries, normalized posts, and run reports.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedEntry`]: One parsed item from an RSS or Atom feed
//! - [`NormalizedPost`]: An entry after cleaning, summarizing, and tagging
//! - [`FeedOutcome`], [`FeedReport`], [`RunReport`]: Per-feed results of a run

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A single item as parsed from a feed.
///
/// Every field is optional because feeds in the wild omit almost anything.
/// The normalizer supplies a fallback for each of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    /// The entry headline.
    pub title: Option<String>,
    /// Link to the original article.
    pub link: Option<String>,
    /// Publication instant, already converted to UTC.
    pub published: Option<DateTime<Utc>>,
    /// Short description (`<description>` or `<summary>`), usually HTML.
    pub summary: Option<String>,
    /// Full content blocks (`<content:encoded>` or `<content>`), in document order.
    pub content: Vec<EntryContent>,
    /// Category labels, in document order.
    pub tags: Vec<EntryTag>,
}

/// One content block of a [`FeedEntry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryContent {
    pub value: String,
}

/// One category of a [`FeedEntry`]. `term` is `None` when the category had no label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryTag {
    pub term: Option<String>,
}

/// A feed entry reduced to everything a post needs.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub title: String,
    pub link: String,
    /// Calendar date in the local time zone of the running process.
    pub date: NaiveDate,
    pub lang: String,
    pub summary: String,
    pub tags: Vec<String>,
}

/// What happened to a single feed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedOutcome {
    /// The feed was fetched; `created` posts were written (skips excluded).
    Processed { created: usize },
    /// The feed could not be fetched or parsed.
    Failed { reason: String },
}

/// A [`FeedOutcome`] together with the feed it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedReport {
    pub lang: String,
    pub url: String,
    #[serde(flatten)]
    pub outcome: FeedOutcome,
}

/// Aggregated results of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub feeds: Vec<FeedReport>,
}

impl RunReport {
    /// Total number of posts written across every processed feed.
    pub fn total_created(&self) -> usize {
        self.feeds
            .iter()
            .map(|f| match f.outcome {
                FeedOutcome::Processed { created } => created,
                FeedOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// Number of feeds that failed to fetch or parse.
    pub fn failed_feeds(&self) -> usize {
        self.feeds
            .iter()
            .filter(|f| matches!(f.outcome, FeedOutcome::Failed { .. }))
            .count()
    }
}
