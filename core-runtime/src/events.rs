//! # Event Bus System
//!
//! Typed broadcast channel (`tokio::sync::broadcast`) through which the
//! playlist service and the playback controller announce what they did.
//!
//! ## Overview
//!
//! The status sink is the primary, ordered UI contract. The event bus is a
//! secondary fan-out for anything else that wants to observe the player
//! (analytics, a "now playing" widget, integration tests) without being wired
//! into the controller.
//!
//! ```text
//! ┌──────────────────┐   emit   ┌───────────┐  subscribe  ┌────────────┐
//! │ PlayerService    ├─────────>│           ├────────────>│ Subscriber │
//! └──────────────────┘          │ EventBus  │             └────────────┘
//! ┌──────────────────┐   emit   │           │  subscribe  ┌────────────┐
//! │ PlaybackController├────────>│           ├────────────>│ Subscriber │
//! └──────────────────┘          └───────────┘             └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaylistEvent};
//!
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playlist(PlaylistEvent::Loaded {
//!     channel_count: 12,
//!     dropped_entries: 1,
//! }))
//! .ok();
//!
//! assert!(matches!(rx.try_recv(), Ok(CoreEvent::Playlist(_))));
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; keep going.
//! - **`RecvError::Closed`**: every sender was dropped; shut down.
//!
//! `emit` returns an error when nobody is subscribed. Publishers ignore it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError, TryRecvError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Playlist(PlaylistEvent),
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playlist(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playlist(PlaylistEvent::LoadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Retrying { .. })
            | CoreEvent::Playback(PlaybackEvent::FellBack { .. }) => EventSeverity::Warning,
            CoreEvent::Playlist(PlaylistEvent::Loaded { .. })
            | CoreEvent::Playback(PlaybackEvent::SessionStarted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playlist Events
// ============================================================================

/// Events emitted while fetching, parsing and filtering the channel list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaylistEvent {
    /// A playlist fetch started.
    Loading {
        /// Playlist URL with any query string removed.
        url: String,
    },
    /// The playlist was fetched and parsed.
    Loaded {
        channel_count: usize,
        /// Marker lines that never resolved a stream URL.
        dropped_entries: usize,
    },
    /// The fetch failed; the channel list is empty.
    LoadFailed { message: String },
    /// The visible list was narrowed by a search query.
    Filtered { query: String, matches: usize },
}

impl PlaylistEvent {
    fn description(&self) -> &str {
        match self {
            PlaylistEvent::Loading { .. } => "Loading playlist",
            PlaylistEvent::Loaded { .. } => "Playlist loaded",
            PlaylistEvent::LoadFailed { .. } => "Playlist load failed",
            PlaylistEvent::Filtered { .. } => "Channel list filtered",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the playback controller, tagged with the session
/// generation they belong to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A new session took over.
    SessionStarted { generation: u64, url: String },
    /// The session moved to a new state.
    StateChanged { generation: u64, state: String },
    /// A fatal engine error triggered a reload.
    Retrying {
        generation: u64,
        attempt: u32,
        max_retries: u32,
    },
    /// Retries were exhausted; playback moved to the native sink.
    FellBack { generation: u64 },
    /// The session ended without playback.
    Failed { generation: u64, message: String },
    /// The session's engine handle was destroyed.
    EngineReleased { generation: u64 },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::SessionStarted { .. } => "Playback session started",
            PlaybackEvent::StateChanged { .. } => "Playback state changed",
            PlaybackEvent::Retrying { .. } => "Retrying stream load",
            PlaybackEvent::FellBack { .. } => "Switched to native playback",
            PlaybackEvent::Failed { .. } => "Playback failed",
            PlaybackEvent::EngineReleased { .. } => "Streaming engine released",
        }
    }

    /// Generation of the session the event belongs to.
    pub fn generation(&self) -> u64 {
        match self {
            PlaybackEvent::SessionStarted { generation, .. }
            | PlaybackEvent::StateChanged { generation, .. }
            | PlaybackEvent::Retrying { generation, .. }
            | PlaybackEvent::FellBack { generation }
            | PlaybackEvent::Failed { generation, .. }
            | PlaybackEvent::EngineReleased { generation } => *generation,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel.
///
/// Cloning an `EventBus` shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified per-subscriber buffer.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no matching event is currently queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(n)) => return Some(Err(RecvError::Lagged(n))),
                Err(TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    fn matches(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
