//! Markdown post files with Jekyll-style front matter.
//!
//! A post's filename is a pure function of its date and title:
//!
//! ```text
//! output_dir/
//! ├── 2024-03-01-gpt-5-whats-new.md
//! └── 2024-03-02-umela-inteligence-v-praxi.md
//! ```
//!
//! That filename is the only duplicate check. A post is written once with a
//! create-only open and is never updated afterwards, so a re-titled repost
//! of the same link becomes a new file and an unrelated article with the
//! same title and date is silently skipped.

use crate::models::NormalizedPost;
use crate::utils::slugify;
use chrono::NaiveDate;
use itertools::Itertools;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Maximum length of the title slug inside a filename, in characters.
pub const SLUG_MAX_CHARS: usize = 80;

/// Result of trying to write one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(PathBuf),
    /// A file with the same name was already there.
    Skipped(PathBuf),
}

impl WriteOutcome {
    /// 1 for a newly written file, 0 for a skip.
    pub fn created_count(&self) -> usize {
        match self {
            WriteOutcome::Created(_) => 1,
            WriteOutcome::Skipped(_) => 0,
        }
    }
}

/// `{YYYY-MM-DD}-{slug}.md`, with the slug cut to 80 characters.
pub fn post_filename(date: NaiveDate, title: &str) -> String {
    let slug: String = slugify(title).chars().take(SLUG_MAX_CHARS).collect();
    format!("{}-{}.md", date.format("%Y-%m-%d"), slug)
}

/// Render the full file contents for a post.
///
/// # Output
///
/// ```text
/// ---
/// layout: post
/// title: "<title>"
/// date: 2024-03-01
/// lang: en
/// tags: [ai, news]
/// ---
///
/// > Zdroj: [<link>](<link>)
///
/// <summary>
///
/// **Takeaways**
/// - Klíčové: ai
/// - Odkaz na zdroj je uveden výše.
/// ```
///
/// Double quotes in the title become single quotes so the YAML string stays
/// well-formed.
pub fn render_post(post: &NormalizedPost) -> String {
    let key_tag = post.tags.first().map(String::as_str).unwrap_or("ai");
    let front_matter = [
        "---".to_string(),
        "layout: post".to_string(),
        format!("title: \"{}\"", post.title.replace('"', "'")),
        format!("date: {}", post.date.format("%Y-%m-%d")),
        format!("lang: {}", post.lang),
        format!("tags: [{}]", post.tags.iter().join(", ")),
        "---".to_string(),
    ]
    .join("\n");

    format!(
        "{front_matter}\n\n\
         > Zdroj: [{link}]({link})\n\n\
         {summary}\n\n\
         **Takeaways**\n\
         - Klíčové: {key_tag}\n\
         - Odkaz na zdroj je uveden výše.\n",
        link = post.link,
        summary = post.summary,
    )
}

/// Write `post` into `output_dir` unless its filename is already taken.
///
/// The directory is created if needed. The existence check happens before
/// rendering; the write itself is create-only, so a file that appears in
/// between is also reported as [`WriteOutcome::Skipped`].
///
/// # Errors
///
/// Any other I/O failure (permissions, disk full) is returned as-is.
#[instrument(level = "info", skip_all, fields(title = %post.title, date = %post.date))]
pub async fn write_post(output_dir: &Path, post: &NormalizedPost) -> std::io::Result<WriteOutcome> {
    let path = output_dir.join(post_filename(post.date, &post.title));

    if fs::try_exists(&path).await? {
        debug!(path = %path.display(), "Post already exists; skipping");
        return Ok(WriteOutcome::Skipped(path));
    }

    let markdown = render_post(post);
    fs::create_dir_all(output_dir).await?;

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "Post appeared before write; skipping");
            return Ok(WriteOutcome::Skipped(path));
        }
        Err(e) => return Err(e),
    };
    file.write_all(markdown.as_bytes()).await?;
    file.flush().await?;

    info!(path = %path.display(), bytes = markdown.len(), "Wrote post");
    Ok(WriteOutcome::Created(path))
}
