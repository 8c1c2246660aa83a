//! EXTINF playlist parser.
//!
//! A marker line (`#EXTINF...`) opens an entry. The entry's stream URL is the
//! next line that is neither blank nor a `#` comment; another marker line or
//! the end of input closes the entry without a URL, and such entries are
//! dropped.
//!
//! Name resolution for a marker line, first match wins:
//!
//! 1. `tvg-name` attribute, quoted or bare
//! 2. `title` attribute, quoted only
//! 3. text after the last comma outside double quotes
//! 4. [`UNKNOWN_CHANNEL_NAME`]

use crate::channel::{ChannelRecord, UNKNOWN_CHANNEL_NAME};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const ENTRY_MARKER: &str = "#EXTINF";
const ATTRIBUTE_PREFIX: &str = "#EXTINF:";
const COMMENT_PREFIX: char = '#';

// Keys must start the segment or follow whitespace so `group-title` never
// matches `title`.
static TVG_NAME_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|\s)tvg-name\s*=\s*"([^"]*)""#).unwrap());
static TVG_NAME_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|\s)tvg-name\s*=\s*([^\s"]+)"#).unwrap());
static TITLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|\s)title\s*=\s*"([^"]*)""#).unwrap());

/// Outcome of a parse, with diagnostics counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Playable channels in document order.
    pub channels: Vec<ChannelRecord>,
    /// Marker lines encountered.
    pub markers: usize,
    /// Marker lines that never resolved a stream URL.
    pub dropped: usize,
}

/// Parses playlist text into channel records.
///
/// Never fails: empty or comment-only input yields an empty list.
///
/// ```
/// use core_playlist::parse;
///
/// let channels = parse("#EXTINF:-1,Display Only\nhttp://x/y.m3u8");
/// assert_eq!(channels[0].name(), "Display Only");
/// assert_eq!(channels[0].url(), "http://x/y.m3u8");
/// ```
pub fn parse(text: &str) -> Vec<ChannelRecord> {
    parse_with_report(text).channels
}

/// Same as [`parse`], also counting marker lines and dropped entries.
pub fn parse_with_report(text: &str) -> ParseReport {
    let mut report = ParseReport::default();
    let mut pending: Option<PlaylistEntryBuilder> = None;

    for line in text.lines().map(str::trim) {
        if line.starts_with(ENTRY_MARKER) {
            if let Some(abandoned) = pending.take() {
                report.push(abandoned);
            }
            report.markers += 1;
            pending = Some(PlaylistEntryBuilder::from_marker(line));
        } else if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        } else if let Some(mut entry) = pending.take() {
            entry.url = line.to_string();
            report.push(entry);
        }
        // Anything else is a stray line outside an entry.
    }

    if let Some(abandoned) = pending.take() {
        report.push(abandoned);
    }

    debug!(
        markers = report.markers,
        channels = report.channels.len(),
        dropped = report.dropped,
        "Parsed playlist"
    );

    report
}

impl ParseReport {
    fn push(&mut self, entry: PlaylistEntryBuilder) {
        match entry.finish() {
            Some(record) => self.channels.push(record),
            None => self.dropped += 1,
        }
    }
}

/// Accumulates one entry between its marker line and its URL line.
#[derive(Debug)]
struct PlaylistEntryBuilder {
    name: String,
    url: String,
}

impl PlaylistEntryBuilder {
    fn from_marker(line: &str) -> Self {
        Self {
            name: resolve_name(line),
            url: String::new(),
        }
    }

    fn finish(self) -> Option<ChannelRecord> {
        ChannelRecord::new(self.name, self.url)
    }
}

fn resolve_name(line: &str) -> String {
    // An unbalanced quote makes the attribute segment unreadable; fall back
    // to the text after the last raw comma.
    if line.matches('"').count() % 2 == 1 {
        return line
            .rfind(',')
            .map(|idx| line[idx + 1..].trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_CHANNEL_NAME)
            .to_string();
    }

    let commas = top_level_commas(line);

    let display = commas
        .last()
        .map(|&idx| line[idx + 1..].trim())
        .filter(|name| !name.is_empty());

    let attribute = commas
        .first()
        .and_then(|&idx| attribute_segment(&line[..idx]))
        .and_then(attribute_name);

    attribute
        .or_else(|| display.map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_CHANNEL_NAME.to_string())
}

/// Byte offsets of commas that are not inside double quotes.
fn top_level_commas(line: &str) -> Vec<usize> {
    let mut in_quotes = false;
    line.char_indices()
        .filter_map(|(idx, ch)| match ch {
            '"' => {
                in_quotes = !in_quotes;
                None
            }
            ',' if !in_quotes => Some(idx),
            _ => None,
        })
        .collect()
}

/// The text between the duration field and the first top-level comma.
///
/// `head` is the marker line up to (not including) that comma.
fn attribute_segment(head: &str) -> Option<&str> {
    let rest = head.strip_prefix(ATTRIBUTE_PREFIX)?.trim_start();
    let (_duration, attributes) = rest.split_once(char::is_whitespace)?;
    Some(attributes)
}

fn attribute_name(segment: &str) -> Option<String> {
    capture(&TVG_NAME_QUOTED, segment)
        .or_else(|| capture(&TVG_NAME_BARE, segment))
        .or_else(|| capture(&TITLE_QUOTED, segment))
}

fn capture(pattern: &Regex, segment: &str) -> Option<String> {
    pattern
        .captures(segment)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str().trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
