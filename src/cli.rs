//! Command-line interface definitions.
//!
//! All arguments have defaults, so a bare `rss_to_posts` run reproduces the
//! usual nightly job: the built-in feed list, five entries per feed, posts
//! into `_posts/`.

use crate::config::DEFAULT_MAX_ENTRIES;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the feed-to-posts job.
///
/// # Examples
///
/// ```sh
/// # Built-in feeds into ./_posts
/// rss_to_posts
///
/// # Custom feed list and site directory
/// rss_to_posts -f feeds.yaml -o ../site/_posts
///
/// # Also write a machine-readable summary of the run
/// rss_to_posts --report-json ./run.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory the Markdown posts are written to
    #[arg(short, long, env = "POSTS_DIR", default_value = "_posts")]
    pub output_dir: PathBuf,

    /// Optional YAML file replacing the built-in feed registry
    #[arg(short, long)]
    pub feeds: Option<PathBuf>,

    /// Number of entries taken from the top of each feed
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_ENTRIES)]
    pub max_entries: usize,

    /// Write a JSON summary of the run to this path
    #[arg(long)]
    pub report_json: Option<PathBuf>,
}
