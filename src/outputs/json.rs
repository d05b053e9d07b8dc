//! JSON run report.
//!
//! When requested on the command line, the per-feed results of a run are
//! serialized next to the posts so a scheduler or dashboard can pick them up:
//!
//! ```json
//! {
//!   "finished_at": "2024-03-01T10:30:00+00:00",
//!   "total_created": 3,
//!   "failed_feeds": 1,
//!   "feeds": [
//!     { "lang": "cs", "url": "https://...", "status": "processed", "created": 3 },
//!     { "lang": "en", "url": "https://...", "status": "failed", "reason": "..." }
//!   ]
//! }
//! ```

use crate::models::{FeedReport, RunReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    finished_at: String,
    total_created: usize,
    failed_feeds: usize,
    feeds: &'a [FeedReport],
}

/// Serialize a [`RunReport`] as pretty-printed JSON.
pub fn report_to_json(report: &RunReport, finished_at: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportDocument {
        finished_at: finished_at.to_rfc3339(),
        total_created: report.total_created(),
        failed_feeds: report.failed_feeds(),
        feeds: &report.feeds,
    })
}

/// Write a [`RunReport`] to `path`, creating parent directories as needed.
///
/// An existing report at `path` is overwritten.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_run_report(report: &RunReport, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = report_to_json(report, Utc::now())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create report dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(feeds = report.feeds.len(), "Wrote JSON run report");
    Ok(())
}
