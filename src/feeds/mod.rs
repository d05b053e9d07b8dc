//! Feed retrieval and parsing.
//!
//! Every feed goes through the same two steps:
//!
//! 1. **Fetching**: download the feed document over HTTP ([`http`])
//! 2. **Parsing**: turn the RSS or Atom XML into [`FeedEntry`] values ([`parse`])
//!
//! The pipeline only talks to the [`FeedSource`] trait so tests can swap in
//! an in-memory source.
//!
//! # Supported Formats
//!
//! | Format | Entry element | Notes |
//! |--------|---------------|-------|
//! | RSS 2.0 | `<item>` | `content:encoded`, `category`, RFC 2822 `pubDate` |
//! | RSS 1.0 (RDF) | `<item>` | `dc:date` |
//! | Atom 1.0 | `<entry>` | `link href`, `category term`, RFC 3339 `published` |

pub mod http;
pub mod parse;

use crate::models::FeedEntry;
use thiserror::Error;

pub use http::HttpFeedSource;

/// Why a feed could not be turned into entries.
///
/// A fetch never yields partial data: either the whole document parsed or
/// one of these is returned.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid feed url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed feed xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Anything that can turn a feed URL into a list of entries.
pub trait FeedSource {
    /// Fetch and parse the feed at `url`, returning its entries in document order.
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError>;
}
