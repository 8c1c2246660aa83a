//! # Playlist Module
//!
//! Turns an EXTINF-style M3U document into an ordered list of channels.
//!
//! ## Overview
//!
//! - [`parse`] / [`parse_with_report`] - tolerant, single-pass parser
//! - [`ChannelRecord`] - immutable `{ name, url }` pair
//! - [`filter_channels`] - case-insensitive name search over a parsed list
//!
//! Parsing never fails. Malformed attribute syntax degrades to the display
//! name, and entries that never resolve a stream URL are dropped.
//!
//! ```
//! use core_playlist::parse;
//!
//! let text = "#EXTM3U\n#EXTINF:-1 tvg-name=\"News One\",News\nhttp://cdn.example/news.m3u8\n";
//! let channels = parse(text);
//!
//! assert_eq!(channels.len(), 1);
//! assert_eq!(channels[0].name(), "News One");
//! ```

pub mod channel;
pub mod filter;
pub mod parser;

pub use channel::{ChannelRecord, UNKNOWN_CHANNEL_NAME};
pub use filter::filter_channels;
pub use parser::{parse, parse_with_report, ParseReport};
