//! Turning a raw [`FeedEntry`] into a [`NormalizedPost`].
//!
//! Every field has a fallback so that no entry, however malformed, fails
//! normalization:
//!
//! | Field | Source | Fallback |
//! |-------|--------|----------|
//! | title | `title`, trimmed | `"AI News"` |
//! | link | `link` | empty string |
//! | date | `published` | the current instant |
//! | body | `summary`, then first `content` block | empty string |
//! | tags | first 3 categories, slugged | `["ai", "news"]` |

use crate::models::{FeedEntry, NormalizedPost};
use crate::utils::slugify;
use chrono::{DateTime, Local, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};

pub const DEFAULT_TITLE: &str = "AI News";
pub const DEFAULT_TAGS: [&str; 2] = ["ai", "news"];
pub const SUMMARY_MAX_CHARS: usize = 800;
pub const SUMMARY_MAX_SENTENCES: usize = 6;
pub const MAX_TAGS: usize = 3;

const DROPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize one entry for the feed language `lang`.
///
/// `now` stands in for the publication time when the entry has none.
pub fn normalize_entry(entry: &FeedEntry, lang: &str, now: DateTime<Utc>) -> NormalizedPost {
    let text = clean_html(raw_body(entry));
    NormalizedPost {
        title: resolve_title(entry.title.as_deref()),
        link: entry.link.clone().unwrap_or_default(),
        date: resolve_local_date(entry.published, now),
        lang: lang.to_string(),
        summary: summarize(&text),
        tags: derive_tags(entry),
    }
}

pub fn resolve_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}

/// Calendar date of `published` (or `now`) in the process's local time zone.
///
/// Running the same feed under a different `TZ` can move a post to the
/// neighbouring day, and with it the filename.
pub fn resolve_local_date(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> NaiveDate {
    published.unwrap_or(now).with_timezone(&Local).date_naive()
}

/// The summary if it is non-empty, else the first content block.
pub fn raw_body(entry: &FeedEntry) -> &str {
    match entry.summary.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => entry
            .content
            .first()
            .map(|c| c.value.as_str())
            .unwrap_or(""),
    }
}

/// Strip markup from an HTML fragment and collapse whitespace.
///
/// `script`, `style` and `noscript` elements are removed along with their
/// text. Remaining text nodes are joined with single spaces.
pub fn clean_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);

    let mut pieces: Vec<&str> = Vec::new();
    for node in fragment.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| DROPPED_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            pieces.push(text);
        }
    }

    let joined = pieces.join(" ");
    WHITESPACE.replace_all(joined.trim(), " ").into_owned()
}

/// Build a short summary from cleaned text.
///
/// Splits on `". "`, keeps the first six pieces, and joins them back. If the
/// result is longer than 800 characters it is cut at the last space within
/// the first 800 characters and an ellipsis is appended, so the result never
/// exceeds 800 characters. Abbreviations and decimals are not protected.
pub fn summarize(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let chosen = text
        .split(". ")
        .take(SUMMARY_MAX_SENTENCES)
        .collect::<Vec<_>>()
        .join(". ");
    let chosen = chosen.trim();

    if chosen.chars().count() <= SUMMARY_MAX_CHARS {
        return chosen.to_string();
    }

    let head: String = chosen.chars().take(SUMMARY_MAX_CHARS).collect();
    let cut = match head.rfind(' ') {
        Some(idx) => head[..idx].to_string(),
        // A single 800-character token: leave room for the ellipsis
        None => head.chars().take(SUMMARY_MAX_CHARS - 1).collect(),
    };
    format!("{cut}…")
}

/// Tag tokens for an entry.
///
/// Looks at the first three categories only, skips the ones without a label,
/// slugs each label and removes its hyphens (`"Machine Learning"` becomes
/// `"machinelearning"`). Falls back to `["ai", "news"]` when nothing usable
/// remains.
pub fn derive_tags(entry: &FeedEntry) -> Vec<String> {
    let tags: Vec<String> = entry
        .tags
        .iter()
        .take(MAX_TAGS)
        .filter_map(|t| t.term.as_deref())
        .map(|term| slugify(term).replace('-', ""))
        .filter(|token| !token.is_empty())
        .collect();

    if tags.is_empty() {
        DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
    } else {
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryContent, EntryTag};
    use chrono::TimeZone;

    fn tagged(terms: &[Option<&str>]) -> FeedEntry {
        FeedEntry {
            tags: terms
                .iter()
                .map(|t| EntryTag {
                    term: t.map(str::to_string),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_html_drops_scripts() {
        assert_eq!(
            clean_html("<p>Hello <script>bad()</script>World</p>"),
            "Hello World"
        );
    }

    #[test]
    fn test_clean_html_drops_style_and_noscript() {
        let html = "<style>p { color: red }</style><div>One</div><noscript>enable js</noscript><div>Two</div>";
        assert_eq!(clean_html(html), "One Two");
    }

    #[test]
    fn test_clean_html_collapses_whitespace_and_entities() {
        let html = "  <p>Line\n\tone&nbsp;&amp; <em>two</em></p>\n\n<p>three</p>  ";
        assert_eq!(clean_html(html), "Line one & two three");
    }

    #[test]
    fn test_clean_html_empty() {
        assert_eq!(clean_html(""), "");
        assert_eq!(clean_html("<p>   </p>"), "");
    }

    #[test]
    fn test_clean_html_plain_text_passthrough() {
        assert_eq!(clean_html("just text"), "just text");
    }

    #[test]
    fn test_summarize_takes_six_sentences() {
        let text = "One. Two. Three. Four. Five. Six. Seven. Eight.";
        assert_eq!(summarize(text), "One. Two. Three. Four. Five. Six");
    }

    #[test]
    fn test_summarize_short_text_untouched() {
        assert_eq!(summarize("Some text. More text. Third."), "Some text. More text. Third.");
        assert_eq!(summarize(""), "");
        assert_eq!(summarize("   "), "");
    }

    #[test]
    fn test_summarize_does_not_protect_abbreviations() {
        let text = "Dr. A. B. C. D. E. F. G.";
        assert_eq!(summarize(text), "Dr. A. B. C. D. E");
    }

    #[test]
    fn test_summarize_exactly_800_is_kept() {
        let text = format!("{} {}", "a".repeat(399), "b".repeat(400));
        assert_eq!(text.chars().count(), 800);
        assert_eq!(summarize(&text), text);
    }

    #[test]
    fn test_summarize_801_is_truncated_at_word_boundary() {
        let text = format!("{} {}", "a".repeat(399), "b".repeat(401));
        assert_eq!(text.chars().count(), 801);

        let summary = summarize(&text);
        assert_eq!(summary, format!("{}…", "a".repeat(399)));
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS);
    }

    #[test]
    fn test_summarize_long_text_stays_bounded() {
        let text = "word ".repeat(500);
        let summary = summarize(&text);
        assert!(summary.ends_with("word…"));
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS);
    }

    #[test]
    fn test_summarize_counts_characters_not_bytes() {
        let text = format!("{} {}", "č".repeat(500), "ř".repeat(200));
        assert_eq!(summarize(&text), text);
    }

    #[test]
    fn test_summarize_single_long_token() {
        let summary = summarize(&"x".repeat(1000));
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS);
        assert!(summary.ends_with('…'));
    }

    #[test]
    fn test_derive_tags_slugs_and_joins() {
        let entry = tagged(&[Some("Machine Learning"), Some("AI")]);
        assert_eq!(derive_tags(&entry), vec!["machinelearning", "ai"]);
    }

    #[test]
    fn test_derive_tags_default_when_absent() {
        assert_eq!(derive_tags(&FeedEntry::default()), vec!["ai", "news"]);
    }

    #[test]
    fn test_derive_tags_only_first_three() {
        let entry = tagged(&[Some("a"), Some("b"), Some("c"), Some("d")]);
        assert_eq!(derive_tags(&entry), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_derive_tags_skips_unlabelled_within_first_three() {
        let entry = tagged(&[None, Some("Umělá inteligence"), None, Some("late")]);
        assert_eq!(derive_tags(&entry), vec!["umelainteligence"]);
    }

    #[test]
    fn test_derive_tags_all_unusable_falls_back() {
        let entry = tagged(&[None, Some("!!!")]);
        assert_eq!(derive_tags(&entry), vec!["ai", "news"]);
    }

    #[test]
    fn test_resolve_title() {
        assert_eq!(resolve_title(Some("  Spaced  ")), "Spaced");
        assert_eq!(resolve_title(Some("   ")), "AI News");
        assert_eq!(resolve_title(None), "AI News");
    }

    #[test]
    fn test_raw_body_prefers_summary() {
        let entry = FeedEntry {
            summary: Some("<p>summary</p>".to_string()),
            content: vec![EntryContent {
                value: "<p>content</p>".to_string(),
            }],
            ..Default::default()
        };
        assert_eq!(raw_body(&entry), "<p>summary</p>");
    }

    #[test]
    fn test_raw_body_falls_back_to_content() {
        let entry = FeedEntry {
            summary: Some(String::new()),
            content: vec![
                EntryContent {
                    value: "first".to_string(),
                },
                EntryContent {
                    value: "second".to_string(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(raw_body(&entry), "first");
        assert_eq!(raw_body(&FeedEntry::default()), "");
    }

    #[test]
    fn test_resolve_local_date_uses_published() {
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let expected = published.with_timezone(&Local).date_naive();
        assert_eq!(resolve_local_date(Some(published), now), expected);
    }

    #[test]
    fn test_resolve_local_date_falls_back_to_now() {
        let now = Utc.with_ymd_and_hms(2030, 6, 15, 12, 0, 0).unwrap();
        let expected = now.with_timezone(&Local).date_naive();
        assert_eq!(resolve_local_date(None, now), expected);
    }

    #[test]
    fn test_normalize_entry_end_to_end() {
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let entry = FeedEntry {
            title: Some(" Test Post ".to_string()),
            link: Some("http://x".to_string()),
            published: Some(published),
            summary: Some("<p>Some text. More text. Third.</p>".to_string()),
            ..Default::default()
        };

        let post = normalize_entry(&entry, "en", Utc::now());
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.link, "http://x");
        assert_eq!(post.lang, "en");
        assert_eq!(post.date, published.with_timezone(&Local).date_naive());
        assert_eq!(post.summary, "Some text. More text. Third.");
        assert_eq!(post.tags, vec!["ai", "news"]);
    }

    #[test]
    fn test_normalize_entry_missing_everything() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let post = normalize_entry(&FeedEntry::default(), "cs", now);
        assert_eq!(post.title, "AI News");
        assert_eq!(post.link, "");
        assert_eq!(post.summary, "");
        assert_eq!(post.tags, vec!["ai", "news"]);
    }
}
