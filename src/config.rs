//! Feed registry and pipeline configuration.
//!
//! The registry maps a language code to an ordered list of feed URLs. A
//! built-in registry is used unless a YAML file is supplied on the command
//! line:
//!
//! ```yaml
//! - lang: cs
//!   urls:
//!     - https://www.root.cz/rss/clanky/
//! - lang: en
//!   urls:
//!     - https://www.technologyreview.com/feed/ai/
//! ```
//!
//! URLs are not validated here. A malformed or unreachable URL surfaces as a
//! per-feed failure when the pipeline runs.

use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Number of entries taken from the head of each feed per run.
pub const DEFAULT_MAX_ENTRIES: usize = 5;

/// Feed URLs for one language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedGroup {
    pub lang: String,
    pub urls: Vec<String>,
}

/// Ordered language groups. Order is preserved and duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FeedRegistry {
    pub groups: Vec<FeedGroup>,
}

impl Default for FeedRegistry {
    fn default() -> Self {
        let group = |lang: &str, urls: &[&str]| FeedGroup {
            lang: lang.to_string(),
            urls: urls.iter().map(|u| u.to_string()).collect(),
        };
        Self {
            groups: vec![
                group(
                    "cs",
                    &[
                        "https://www.root.cz/rss/clanky/",
                        "https://www.denikn.cz/tema/umela-inteligence/feed/",
                        "https://www.lupa.cz/rss/clanky/",
                    ],
                ),
                group(
                    "en",
                    &[
                        "https://feeds.feedburner.com/Techcrunch/artificial-intelligence",
                        "https://www.theverge.com/rss/ai-artificial-intelligence/index.xml",
                        "https://www.technologyreview.com/feed/ai/",
                    ],
                ),
            ],
        }
    }
}

impl FeedRegistry {
    /// Parse a registry from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load a registry from a YAML file on disk.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path).await?;
        let registry = Self::from_yaml(&text)?;
        info!(
            groups = registry.groups.len(),
            feeds = registry.feed_count(),
            "Loaded feed registry"
        );
        Ok(registry)
    }

    /// Iterate `(lang, url)` pairs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.groups
            .iter()
            .flat_map(|g| g.urls.iter().map(move |u| (g.lang.as_str(), u.as_str())))
    }

    pub fn feed_count(&self) -> usize {
        self.groups.iter().map(|g| g.urls.len()).sum()
    }
}

/// Everything the pipeline needs for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub registry: FeedRegistry,
    /// Directory the post files are written to.
    pub output_dir: PathBuf,
    pub max_entries_per_feed: usize,
}

impl PipelineConfig {
    pub fn new(registry: FeedRegistry, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            output_dir: output_dir.into(),
            max_entries_per_feed: DEFAULT_MAX_ENTRIES,
        }
    }
}
