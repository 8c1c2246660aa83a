//! Channel search.

use crate::channel::ChannelRecord;

/// Returns the channels whose name contains `query`, ignoring case.
///
/// The query is trimmed first; a blank query returns the full list. Order is
/// preserved.
///
/// ```
/// use core_playlist::{filter_channels, ChannelRecord};
///
/// let channels = vec![
///     ChannelRecord::new("BBC News", "http://x/1").unwrap(),
///     ChannelRecord::new("Cartoons", "http://x/2").unwrap(),
/// ];
/// let hits = filter_channels(&channels, "news");
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].name(), "BBC News");
/// ```
pub fn filter_channels(channels: &[ChannelRecord], query: &str) -> Vec<ChannelRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return channels.to_vec();
    }

    channels
        .iter()
        .filter(|channel| channel.name().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ChannelRecord> {
        vec![
            ChannelRecord::new("Sky News", "http://x/1").unwrap(),
            ChannelRecord::new("Sports Arena", "http://x/2").unwrap(),
            ChannelRecord::new("NEWS 24", "http://x/3").unwrap(),
        ]
    }

    #[test]
    fn test_blank_query_returns_all() {
        assert_eq!(filter_channels(&sample(), ""), sample());
        assert_eq!(filter_channels(&sample(), "   "), sample());
    }

    #[test]
    fn test_case_insensitive_substring() {
        let hits = filter_channels(&sample(), " News ");
        let names: Vec<_> = hits.iter().map(ChannelRecord::name).collect();
        assert_eq!(names, ["Sky News", "NEWS 24"]);
    }

    #[test]
    fn test_no_match() {
        assert!(filter_channels(&sample(), "weather").is_empty());
    }

    #[test]
    fn test_does_not_match_urls() {
        assert!(filter_channels(&sample(), "http").is_empty());
    }
}
