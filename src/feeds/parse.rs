//! RSS and Atom parsing on top of `quick-xml`.
//!
//! The parser is a small event loop: it opens a [`FeedEntry`] on `<item>` or
//! `<entry>`, captures the text of the fields it knows about, and closes the
//! entry on the matching end tag. Channel-level elements are ignored.

use crate::models::{EntryContent, EntryTag, FeedEntry};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use quick_xml::Reader;
use quick_xml::errors::{Error as XmlError, IllFormedError};
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};

/// Entry fields whose text content is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Summary,
    Content,
    Category,
    Published,
}

impl Field {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "link" => Some(Self::Link),
            "description" | "summary" => Some(Self::Summary),
            "content:encoded" | "content" => Some(Self::Content),
            "category" => Some(Self::Category),
            "pubDate" | "published" | "dc:date" => Some(Self::Published),
            _ => None,
        }
    }
}

/// The field currently being captured.
#[derive(Debug)]
struct Capture {
    field: Field,
    text: String,
    /// Nested elements opened inside the field (Atom xhtml content).
    depth: usize,
    /// Atom category label taken from the `term` attribute.
    term: Option<String>,
}

/// Parse an RSS or Atom document into entries, in document order.
///
/// # Errors
///
/// Returns the underlying [`quick_xml::Error`] if the document is not
/// well-formed XML, including a document cut off before its elements are
/// closed. No entries are returned in that case.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut capture: Option<Capture> = None;
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = tag_name(&e);
                open.push(name.clone());
                if let Some(cap) = capture.as_mut() {
                    cap.depth += 1;
                    continue;
                }
                if is_entry_tag(&name) {
                    current = Some(FeedEntry::default());
                } else if let Some(entry) = current.as_mut() {
                    if name == "link" && apply_atom_link(entry, &e) {
                        continue;
                    }
                    if let Some(field) = Field::from_tag(&name) {
                        capture = Some(Capture {
                            field,
                            text: String::new(),
                            depth: 0,
                            term: attr(&e, b"term"),
                        });
                    }
                }
            }
            Event::Empty(e) => {
                if capture.is_some() {
                    continue;
                }
                if let Some(entry) = current.as_mut() {
                    match tag_name(&e).as_str() {
                        "link" => {
                            apply_atom_link(entry, &e);
                        }
                        "category" => entry.tags.push(EntryTag {
                            term: attr(&e, b"term"),
                        }),
                        _ => {}
                    }
                }
            }
            Event::Text(e) => {
                if let Some(cap) = capture.as_mut() {
                    push_text(&mut cap.text, &decode_text(&String::from_utf8_lossy(&e)));
                }
            }
            Event::CData(e) => {
                if let Some(cap) = capture.as_mut() {
                    push_text(&mut cap.text, &String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                open.pop();
                if let Some(cap) = capture.as_mut() {
                    if cap.depth > 0 {
                        cap.depth -= 1;
                        continue;
                    }
                }
                if let Some(cap) = capture.take() {
                    if let Some(entry) = current.as_mut() {
                        apply_capture(entry, cap);
                    }
                    continue;
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if is_entry_tag(&name) {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
            }
            Event::Eof => {
                if let Some(name) = open.pop() {
                    return Err(XmlError::IllFormed(IllFormedError::MissingEndTag(name)));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(entries)
}

fn is_entry_tag(name: &str) -> bool {
    name == "item" || name == "entry"
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// Resolve XML and HTML5 named entities plus character references.
///
/// Entities unknown even to HTML5 are left as written, but only the broken
/// reference is kept raw; every other escape in the text is still resolved.
fn decode_text(raw: &str) -> String {
    if let Ok(text) = unescape_with(raw, resolve_html5_entity) {
        return text.into_owned();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';') {
            Some(semi) => {
                let reference = &tail[..=semi];
                match unescape_with(reference, resolve_html5_entity) {
                    Ok(text) => out.push_str(&text),
                    Err(_) => out.push_str(reference),
                }
                rest = &tail[semi + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn push_text(buf: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(text);
}

/// Handle an Atom `<link href=".."/>`. Returns `false` for RSS-style links
/// without an `href`, whose URL is the element text instead.
fn apply_atom_link(entry: &mut FeedEntry, e: &BytesStart<'_>) -> bool {
    let Some(href) = attr(e, b"href") else {
        return false;
    };
    let alternate = attr(e, b"rel").is_none_or(|rel| rel == "alternate");
    if alternate && entry.link.is_none() {
        entry.link = Some(href);
    }
    true
}

fn apply_capture(entry: &mut FeedEntry, cap: Capture) {
    let text = cap.text;
    match cap.field {
        Field::Title => {
            if entry.title.is_none() {
                entry.title = Some(text);
            }
        }
        Field::Link => {
            if entry.link.is_none() && !text.is_empty() {
                entry.link = Some(text);
            }
        }
        Field::Summary => {
            if entry.summary.is_none() {
                entry.summary = Some(text);
            }
        }
        Field::Content => entry.content.push(EntryContent { value: text }),
        Field::Category => {
            let term = cap.term.or(Some(text)).filter(|t| !t.is_empty());
            entry.tags.push(EntryTag { term });
        }
        Field::Published => {
            if entry.published.is_none() {
                entry.published = parse_date(&text);
            }
        }
    }
}

/// Parse a feed timestamp into UTC.
///
/// Strict RFC 2822 (RSS) and RFC 3339 (Atom, Dublin Core) come first. After
/// that the common deviations seen in real feeds are accepted: full weekday
/// names or no weekday, zone names such as `UTC` or `EST`, no zone at all
/// (read as UTC), and `YYYY-MM-DD HH:MM:SS` with or without an offset.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc2822(text)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_loose_date(text))
}

const LOOSE_DATETIME_FORMATS: [&str; 6] = [
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn parse_loose_date(text: &str) -> Option<DateTime<Utc>> {
    for format in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // "Friday, 01 Mar 2024 ..." -> "01 Mar 2024 ..."
    let body = match text.split_once(',') {
        Some((day, rest)) if day.chars().all(|c| c.is_ascii_alphabetic()) => rest.trim(),
        _ => text,
    };

    let (stamp, offset) = match body.rsplit_once(' ') {
        Some((stamp, zone)) => match zone_offset(zone) {
            Some(offset) => (stamp.trim(), offset),
            None => (body, FixedOffset::east_opt(0)?),
        },
        None => (body, FixedOffset::east_opt(0)?),
    };

    let naive = LOOSE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(stamp, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Offset for a trailing zone token: a name (`UTC`, `PST`, ...) or `+hhmm` / `+hh:mm`.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    let hours = match zone.to_ascii_uppercase().as_str() {
        "UTC" | "GMT" | "UT" | "Z" => Some(0),
        "EDT" => Some(-4),
        "EST" | "CDT" => Some(-5),
        "CST" | "MDT" => Some(-6),
        "MST" | "PDT" => Some(-7),
        "PST" => Some(-8),
        "CET" => Some(1),
        "CEST" => Some(2),
        _ => None,
    };
    if let Some(hours) = hours {
        return FixedOffset::east_opt(hours * 3600);
    }

    let (sign, digits) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    let digits = digits.replace(':', "");
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hh: i32 = digits[..2].parse().ok()?;
    let mm: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hh * 3600 + mm * 60))
}
