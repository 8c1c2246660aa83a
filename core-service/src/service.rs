//! Player façade: fetch → parse → render → auto-select, plus search and
//! selection by list position.

use crate::error::{CoreError, Result};
use crate::search::SearchDebouncer;
use bridge_traits::platform::PlatformSendSync;
use bridge_traits::{HttpClient, StatusSink, StatusUpdate};
use chrono::{DateTime, Utc};
use core_playback::{PlaybackConfig, PlaybackController};
use core_playlist::{filter_channels, parse_with_report, ChannelRecord};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaylistEvent, Receiver};
use core_runtime::logging::strip_url_query;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Host widget that shows the channel list.
pub trait ChannelListView: PlatformSendSync {
    /// Replaces the displayed list.
    fn render(&self, channels: &[ChannelRecord]);
}

impl<F> ChannelListView for F
where
    F: Fn(&[ChannelRecord]) + PlatformSendSync,
{
    fn render(&self, channels: &[ChannelRecord]) {
        self(channels)
    }
}

/// Primary façade exposed to host applications.
pub struct PlayerService {
    playlist_url: String,
    autoplay_first: bool,
    http: Arc<dyn HttpClient>,
    status: Arc<dyn StatusSink>,
    view: Arc<dyn ChannelListView>,
    controller: PlaybackController,
    event_bus: EventBus,
    channels: Vec<ChannelRecord>,
    visible: Vec<ChannelRecord>,
    query: String,
    debouncer: SearchDebouncer,
}

impl PlayerService {
    /// Wires the configured bridges into a playlist + playback service.
    pub fn new(
        config: CoreConfig,
        playback: PlaybackConfig,
        view: Arc<dyn ChannelListView>,
    ) -> Result<Self> {
        let event_bus = EventBus::default();
        let controller = PlaybackController::new(
            playback,
            config.stream_engine,
            config.media_sink,
            Arc::clone(&config.status_sink),
        )?
        .with_clock(config.clock)
        .with_event_bus(event_bus.clone());

        Ok(Self {
            playlist_url: config.playlist_url,
            autoplay_first: config.autoplay_first,
            http: config.http_client,
            status: config.status_sink,
            view,
            controller,
            event_bus,
            channels: Vec::new(),
            visible: Vec::new(),
            query: String::new(),
            debouncer: SearchDebouncer::new(config.search_debounce),
        })
    }

    /// Fetches and parses the playlist, renders it and, if configured,
    /// starts the first channel.
    ///
    /// A fetch failure is reported through the status sink and leaves an
    /// empty list; it is not returned. Returns the number of channels loaded.
    pub async fn load(&mut self) -> usize {
        let url = strip_url_query(&self.playlist_url).to_string();
        info!(url = %url, "Loading playlist");
        self.emit(PlaylistEvent::Loading { url });
        self.status.publish(StatusUpdate::LoadingChannels);

        let text = match self.http.get_text(&self.playlist_url).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to fetch playlist");
                self.channels.clear();
                self.visible.clear();
                self.view.render(&self.visible);
                self.status.publish(StatusUpdate::ChannelsUnavailable {
                    message: e.to_string(),
                });
                self.emit(PlaylistEvent::LoadFailed {
                    message: e.to_string(),
                });
                return 0;
            }
        };

        let report = parse_with_report(&text);
        info!(
            channels = report.channels.len(),
            markers = report.markers,
            dropped = report.dropped,
            "Playlist parsed"
        );
        self.emit(PlaylistEvent::Loaded {
            channel_count: report.channels.len(),
            dropped_entries: report.dropped,
        });

        self.channels = report.channels;
        self.visible = filter_channels(&self.channels, &self.query);
        self.view.render(&self.visible);

        let Some(first) = self.channels.first() else {
            self.status.publish(StatusUpdate::NoChannels);
            return 0;
        };
        let first_url = first.url().to_string();
        self.status.publish(StatusUpdate::Cleared);

        if self.autoplay_first && self.controller.session().is_none() {
            self.controller.select(&first_url);
        }

        self.channels.len()
    }

    /// Re-fetches the playlist, keeping the current session.
    ///
    /// A search still inside its debounce window is committed first, so the
    /// reloaded list is filtered by the latest query.
    pub async fn refresh(&mut self) -> usize {
        if let Some(query) = self.debouncer.flush() {
            debug!(query = %query, "Committing pending search before refresh");
            self.query = query;
        }
        self.load().await
    }

    /// Records a search keystroke; applied by [`poll_search`](Self::poll_search)
    /// once the debounce window has passed.
    pub fn search(&mut self, query: impl Into<String>, now: DateTime<Utc>) {
        self.debouncer.submit(query, now);
    }

    /// Applies a pending search whose debounce window has elapsed.
    ///
    /// Returns `true` if the visible list was re-rendered.
    pub fn poll_search(&mut self, now: DateTime<Utc>) -> bool {
        match self.debouncer.poll(now) {
            Some(query) => {
                self.apply_search(query);
                true
            }
            None => false,
        }
    }

    fn apply_search(&mut self, query: String) {
        self.visible = filter_channels(&self.channels, &query);
        debug!(query = %query, matches = self.visible.len(), "Search applied");
        self.view.render(&self.visible);
        self.emit(PlaylistEvent::Filtered {
            query: query.clone(),
            matches: self.visible.len(),
        });
        self.query = query;
    }

    /// Plays the channel at `index` in the currently rendered list.
    pub fn select_visible(&mut self, index: usize) -> Result<()> {
        let channel = self
            .visible
            .get(index)
            .ok_or(CoreError::ChannelNotFound {
                index,
                len: self.visible.len(),
            })?;
        let url = channel.url().to_string();
        self.controller.select(&url);
        Ok(())
    }

    /// Position in the rendered list of the channel being played, if shown.
    pub fn active_index(&self) -> Option<usize> {
        let url = self.controller.current_url()?;
        self.visible.iter().position(|channel| channel.url() == url)
    }

    pub fn channels(&self) -> &[ChannelRecord] {
        &self.channels
    }

    pub fn visible_channels(&self) -> &[ChannelRecord] {
        &self.visible
    }

    /// The query the visible list was last filtered with.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// Mutable access for event pumping (`pump`, `next_event`, `tick`).
    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// Stops playback. The channel list is kept.
    pub fn shutdown(&mut self) {
        self.controller.stop();
    }

    fn emit(&self, event: PlaylistEvent) {
        // No subscribers is fine.
        let _ = self.event_bus.emit(CoreEvent::Playlist(event));
    }
}

impl std::fmt::Debug for PlayerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerService")
            .field("playlist_url", &strip_url_query(&self.playlist_url))
            .field("channels", &self.channels.len())
            .field("visible", &self.visible.len())
            .field("query", &self.query)
            .field("controller", &self.controller)
            .finish()
    }
}
