use serde::{Deserialize, Serialize};
use std::fmt;

/// Name given to entries whose marker line yields no usable name.
pub const UNKNOWN_CHANNEL_NAME: &str = "Unknown";

/// One playable channel from a playlist.
///
/// Records keep the order in which they appear in the source document.
/// Duplicate names or URLs are legal and preserved. The url is never blank,
/// whether the record was parsed, built with [`ChannelRecord::new`] or
/// deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawChannel")]
pub struct ChannelRecord {
    name: String,
    url: String,
}

#[derive(Deserialize)]
struct RawChannel {
    #[serde(default)]
    name: String,
    url: String,
}

impl TryFrom<RawChannel> for ChannelRecord {
    type Error = String;

    fn try_from(raw: RawChannel) -> Result<Self, Self::Error> {
        ChannelRecord::new(raw.name, raw.url)
            .ok_or_else(|| "channel url must not be blank".to_string())
    }
}

impl ChannelRecord {
    /// Creates a record, or `None` if `url` is blank.
    ///
    /// A blank name is replaced by [`UNKNOWN_CHANNEL_NAME`].
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Option<Self> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return None;
        }

        let name = match name.into().trim() {
            "" => UNKNOWN_CHANNEL_NAME.to_string(),
            trimmed => trimmed.to_string(),
        };

        Some(Self { name, url })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ChannelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
