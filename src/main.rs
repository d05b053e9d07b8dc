//! # rss_to_posts
//!
//! Turns items from RSS and Atom news feeds into Markdown posts for a
//! static site generator.
//!
//! ## Features
//!
//! - Built-in list of Czech and English AI/tech feeds, or a YAML list of your own
//! - HTML cleaning that drops scripts, styles and `noscript` blocks
//! - Short extractive summary (first six sentences, at most 800 characters)
//! - Tags from feed categories, with a fixed fallback
//! - Filename-based deduplication: a post is written once and never touched again
//!
//! ## Usage
//!
//! ```sh
//! rss_to_posts -o ./_posts
//! ```
//!
//! ## Architecture
//!
//! The application is a sequential pipeline, one feed at a time:
//! 1. **Fetching**: Download and parse each feed URL of the registry
//! 2. **Normalizing**: Clean, summarize and tag the first five entries
//! 3. **Writing**: Render front matter + body and create the post file if its name is free
//! 4. **Reporting**: Print the number of new posts, optionally write a JSON report

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod feeds;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod utils;

use cli::Cli;
use config::{FeedRegistry, PipelineConfig};
use feeds::HttpFeedSource;
use outputs::json;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("rss_to_posts starting up");

    let args = Cli::parse();
    debug!(?args.output_dir, ?args.feeds, args.max_entries, "Parsed CLI arguments");

    let registry = match &args.feeds {
        Some(path) => FeedRegistry::load(path).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to load feed registry");
            e
        })?,
        None => FeedRegistry::default(),
    };
    info!(feeds = registry.feed_count(), "Feed registry ready");

    // Early check: the posts directory must be writable before anything is fetched
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Posts directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let mut config = PipelineConfig::new(registry, &args.output_dir);
    config.max_entries_per_feed = args.max_entries;

    let source = HttpFeedSource::new()?;
    let report = pipeline::run(&source, &config).await?;

    if let Some(path) = &args.report_json {
        if let Err(e) = json::write_run_report(&report, path).await {
            warn!(path = %path.display(), error = %e, "Failed to write JSON run report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        feeds = report.feeds.len(),
        failed = report.failed_feeds(),
        "Execution complete"
    );

    println!("Generated {} posts", report.total_created());
    Ok(())
}
