//! The feed-to-posts pipeline.
//!
//! For each `(lang, url)` pair of the registry, in order:
//!
//! 1. fetch and parse the feed through a [`FeedSource`]
//! 2. take the first `max_entries_per_feed` entries
//! 3. normalize each entry and write it as a post unless its filename exists
//!
//! Feeds are processed strictly one after another. A feed that cannot be
//! fetched is recorded as [`FeedOutcome::Failed`] and the run moves on; a
//! filesystem error is fatal and ends the run.

use crate::config::PipelineConfig;
use crate::feeds::{FeedSource, FetchError};
use crate::models::{FeedOutcome, FeedReport, RunReport};
use crate::normalize::normalize_entry;
use crate::outputs::post::write_post;
use crate::utils::truncate_for_log;
use chrono::Utc;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Why processing a single feed stopped.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed itself was unusable. Recoverable: the run continues.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing a post failed. Not recoverable.
    #[error("failed to write post: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetch one feed and write its first `max_entries` entries as posts.
///
/// # Returns
///
/// The number of posts newly created. Entries whose filename already exists
/// are skipped and not counted.
#[instrument(level = "info", skip(source, output_dir))]
pub async fn process_feed<S: FeedSource>(
    source: &S,
    url: &str,
    lang: &str,
    output_dir: &Path,
    max_entries: usize,
) -> Result<usize, FeedError> {
    let entries = source.fetch_entries(url).await?;
    debug!(available = entries.len(), max_entries, "Fetched entries");

    let mut created = 0;
    for entry in entries.iter().take(max_entries) {
        let post = normalize_entry(entry, lang, Utc::now());
        debug!(
            title = %post.title,
            summary = %truncate_for_log(&post.summary, 120),
            tags = ?post.tags,
            "Normalized entry"
        );
        created += write_post(output_dir, &post).await?.created_count();
    }

    info!(created, "Processed feed");
    Ok(created)
}

/// Run the whole registry through the pipeline.
///
/// # Errors
///
/// Only filesystem failures abort the run. Fetch failures end up in the
/// returned [`RunReport`].
#[instrument(level = "info", skip_all, fields(output_dir = %config.output_dir.display()))]
pub async fn run<S: FeedSource>(source: &S, config: &PipelineConfig) -> std::io::Result<RunReport> {
    let mut report = RunReport::default();

    for (lang, url) in config.registry.iter() {
        let outcome = match process_feed(
            source,
            url,
            lang,
            &config.output_dir,
            config.max_entries_per_feed,
        )
        .await
        {
            Ok(created) => FeedOutcome::Processed { created },
            Err(FeedError::Fetch(e)) => {
                warn!(%url, %lang, error = %e, "Feed failed; skipping");
                FeedOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(FeedError::Io(e)) => return Err(e),
        };

        report.feeds.push(FeedReport {
            lang: lang.to_string(),
            url: url.to_string(),
            outcome,
        });
    }

    info!(
        feeds = report.feeds.len(),
        failed = report.failed_feeds(),
        created = report.total_created(),
        "Pipeline finished"
    );
    Ok(report)
}
