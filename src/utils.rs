//! Utility functions for slug generation, log-friendly truncation, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Slugification for post filenames and tag tokens
//! - String truncation for logging
//! - File system validation for the posts directory

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static DIGIT_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d),(\d)").unwrap());
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// a count of the dropped characters appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Convert free text into a lowercase, ASCII, hyphen-separated slug.
///
/// Non-ASCII text is transliterated first (`"Umělá"` becomes `"umela"`,
/// `"Straße"` becomes `"strasse"`, `"東京"` becomes `"dong-jing"`),
/// apostrophes vanish without leaving a separator (`"What's"` becomes
/// `"whats"`), thousands separators between digits are dropped, and every
/// other run of non-alphanumeric characters collapses into a single `-`.
/// Leading and trailing separators are trimmed.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("GPT-5: What's New?"), "gpt-5-whats-new");
/// assert_eq!(slugify("Umělá inteligence"), "umela-inteligence");
/// ```
pub fn slugify(text: &str) -> String {
    let mut folded: String = deunicode(text)
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'')
        .collect();

    // Each pass only joins every other group in runs like "1,2,3"
    loop {
        let joined = DIGIT_COMMA.replace_all(&folded, "$1$2");
        if joined == folded {
            break;
        }
        folded = joined.into_owned();
    }

    DISALLOWED
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let check_path = path.join("..__write_check__");
    match stdfs::File::create(&check_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&check_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
