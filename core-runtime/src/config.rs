//! # Core Configuration Module
//!
//! Provides configuration management for the IPTV player core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host capabilities and settings the player needs.
//! It enforces fail-fast validation so a missing bridge is reported at startup
//! instead of at the first channel selection.
//!
//! ## Required Dependencies
//!
//! - `StreamEngine` - Adaptive-streaming engine
//! - `MediaSink` - Native media element
//! - `StatusSink` - Status line shown to the user
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - Playlist fetch (desktop default: reqwest)
//! - `Clock` - Time source (default: [`SystemClock`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .playlist_url("https://example.com/channels.m3u")
//!     .stream_engine(Arc::new(MyEngine))
//!     .media_sink(Arc::new(MyVideoElement))
//!     .status_sink(Arc::new(|update| println!("{update}")))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No stream engine, media sink or status sink was injected
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing required bridges");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, HttpClient, MediaSink, StatusSink, StreamEngine, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Public IPTV index used when no playlist URL is configured.
pub const DEFAULT_PLAYLIST_URL: &str = "https://iptv-org.github.io/iptv/index.m3u";

/// Quiet period before a search query is applied.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Core configuration for the IPTV player.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Location of the M3U document
    pub playlist_url: String,

    /// Start playing the first channel once the list is loaded
    pub autoplay_first: bool,

    /// Debounce window for search-as-you-type
    pub search_debounce: Duration,

    /// HTTP client for the playlist fetch
    pub http_client: Arc<dyn HttpClient>,

    /// Adaptive-streaming engine
    pub stream_engine: Arc<dyn StreamEngine>,

    /// Native media element
    pub media_sink: Arc<dyn MediaSink>,

    /// Status line
    pub status_sink: Arc<dyn StatusSink>,

    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("playlist_url", &self.playlist_url)
            .field("autoplay_first", &self.autoplay_first)
            .field("search_debounce", &self.search_debounce)
            .field("http_client", &"HttpClient { ... }")
            .field("stream_engine", &"StreamEngine { ... }")
            .field("media_sink", &"MediaSink { ... }")
            .field("status_sink", &"StatusSink { ... }")
            .field("clock", &"Clock { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The playlist URL is an absolute http(s) URL
    /// - The search debounce is under ten seconds
    pub fn validate(&self) -> Result<()> {
        let url = self.playlist_url.trim();
        if url.is_empty() {
            return Err(Error::Config("Playlist URL cannot be empty".to_string()));
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Playlist URL must use http or https: {}",
                crate::logging::strip_url_query(url)
            )));
        }

        if self.search_debounce > Duration::from_secs(10) {
            return Err(Error::Config(
                "Search debounce exceeds maximum of 10 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

fn capability_missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing(
        "HttpClient",
        "HttpClient implementation is required to fetch the playlist. \
         Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
         Web: inject a fetch()-based client.",
    ))
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    playlist_url: Option<String>,
    autoplay_first: Option<bool>,
    search_debounce: Option<Duration>,
    http_client: Option<Arc<dyn HttpClient>>,
    stream_engine: Option<Arc<dyn StreamEngine>>,
    media_sink: Option<Arc<dyn MediaSink>>,
    status_sink: Option<Arc<dyn StatusSink>>,
    clock: Option<Arc<dyn Clock>>,
}

impl CoreConfigBuilder {
    /// Sets the playlist URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder()
    ///     .playlist_url("https://example.com/tv.m3u");
    /// ```
    pub fn playlist_url(mut self, url: impl Into<String>) -> Self {
        self.playlist_url = Some(url.into());
        self
    }

    /// Whether the first channel starts playing after a successful load.
    /// Defaults to `true`.
    pub fn autoplay_first(mut self, enabled: bool) -> Self {
        self.autoplay_first = Some(enabled);
        self
    }

    /// Sets the search debounce window. Defaults to 200 ms.
    pub fn search_debounce(mut self, window: Duration) -> Self {
        self.search_debounce = Some(window);
        self
    }

    /// Sets the HTTP client.
    ///
    /// If not provided, a reqwest client is used when the `desktop-shims`
    /// feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the adaptive-streaming engine (required).
    pub fn stream_engine(mut self, engine: Arc<dyn StreamEngine>) -> Self {
        self.stream_engine = Some(engine);
        self
    }

    /// Sets the native media element (required).
    pub fn media_sink(mut self, sink: Arc<dyn MediaSink>) -> Self {
        self.media_sink = Some(sink);
        self
    }

    /// Sets the status sink (required).
    pub fn status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.status_sink = Some(sink);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Returns an error if a required bridge is missing or a setting is
    /// invalid.
    pub fn build(self) -> Result<CoreConfig> {
        let stream_engine = self.stream_engine.ok_or_else(|| {
            capability_missing(
                "StreamEngine",
                "StreamEngine implementation is required for adaptive playback. \
                 Web: wrap hls.js. Native: wrap the platform HLS stack.",
            )
        })?;

        let media_sink = self.media_sink.ok_or_else(|| {
            capability_missing(
                "MediaSink",
                "MediaSink implementation is required for native and fallback playback. \
                 Web: wrap the <video> element.",
            )
        })?;

        let status_sink = self.status_sink.ok_or_else(|| {
            capability_missing(
                "StatusSink",
                "StatusSink implementation is required to report playback status. \
                 A closure `Fn(StatusUpdate)` is accepted.",
            )
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let config = CoreConfig {
            playlist_url: self
                .playlist_url
                .unwrap_or_else(|| DEFAULT_PLAYLIST_URL.to_string()),
            autoplay_first: self.autoplay_first.unwrap_or(true),
            search_debounce: self.search_debounce.unwrap_or(DEFAULT_SEARCH_DEBOUNCE),
            http_client,
            stream_engine,
            media_sink,
            status_sink,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        config.validate()?;

        Ok(config)
    }
}
