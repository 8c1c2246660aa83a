//! Playback bridge traits: the adaptive-streaming engine, the native media
//! sink, and the generation-tagged event channel both report through.
//!
//! The core never holds callbacks. Instead every capability that completes
//! work asynchronously is handed a [`SessionEvents`] sender stamped with the
//! generation of the playback session that subscribed it. Messages from a
//! superseded session therefore carry a stale generation and are discarded by
//! the controller without any flag bookkeeping on the host side.

use crate::{error::Result, platform::{PlatformSend, PlatformSendSync}};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// MIME type checked against the native sink before taking the direct-playback path.
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// Options passed to [`StreamEngine::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Forward buffer the engine should try to maintain.
    pub max_buffer_length: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_buffer_length: Duration::from_secs(30),
        }
    }
}

/// Category reported by the engine alongside an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorKind {
    Network,
    Media,
    Mux,
    KeySystem,
    /// Synthesised by the core when the manifest never arrived in time.
    Timeout,
    Other,
}

/// Error payload delivered by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineError {
    /// Whether the current load is unrecoverable without reloading.
    pub fatal: bool,
    pub kind: EngineErrorKind,
    /// Engine-specific detail string (e.g. `manifestLoadError`).
    pub details: String,
}

impl EngineError {
    pub fn fatal(kind: EngineErrorKind, details: impl Into<String>) -> Self {
        Self {
            fatal: true,
            kind,
            details: details.into(),
        }
    }

    pub fn non_fatal(kind: EngineErrorKind, details: impl Into<String>) -> Self {
        Self {
            fatal: false,
            kind,
            details: details.into(),
        }
    }
}

/// Asynchronous completion reported by a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The engine parsed the manifest and media can start.
    ManifestParsed,
    /// The engine reported an error.
    EngineError(EngineError),
    /// The native sink refused to start playback.
    PlayRejected { reason: String },
}

/// Which capability produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventOrigin {
    Engine,
    /// `play()` on the sink while it renders the adaptive engine's output.
    Media,
    /// `play()` on the sink pointed directly at the stream url.
    Fallback,
}

/// Generation-tagged message as it travels over the session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMessage {
    pub generation: u64,
    pub origin: EventOrigin,
    pub event: SessionEvent,
}

/// Sender handed to capabilities for reporting completions.
///
/// Cloning is cheap. Sending never blocks; once the controller is gone the
/// message is silently dropped.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    generation: u64,
    origin: EventOrigin,
    tx: UnboundedSender<SessionMessage>,
}

impl SessionEvents {
    pub fn new(generation: u64, origin: EventOrigin, tx: UnboundedSender<SessionMessage>) -> Self {
        Self {
            generation,
            origin,
            tx,
        }
    }

    /// Generation of the session this sender was subscribed for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn origin(&self) -> EventOrigin {
        self.origin
    }

    /// Report that the manifest is ready.
    pub fn manifest_parsed(&self) -> bool {
        self.send(SessionEvent::ManifestParsed)
    }

    /// Report an engine error.
    pub fn error(&self, error: EngineError) -> bool {
        self.send(SessionEvent::EngineError(error))
    }

    /// Report that native `play()` was rejected.
    pub fn play_rejected(&self, reason: impl Into<String>) -> bool {
        self.send(SessionEvent::PlayRejected {
            reason: reason.into(),
        })
    }

    /// Returns `false` when the receiving controller has been dropped.
    pub fn send(&self, event: SessionEvent) -> bool {
        self.tx
            .send(SessionMessage {
                generation: self.generation,
                origin: self.origin,
                event,
            })
            .is_ok()
    }
}

/// A live adaptive-streaming engine instance.
///
/// Exactly one handle exists at a time; the core calls [`destroy`](Self::destroy)
/// exactly once before dropping it.
pub trait EngineHandle: PlatformSend {
    /// Start (or restart) loading the given manifest URL.
    fn load_source(&mut self, url: &str) -> Result<()>;

    /// Bind the engine output to the native media sink.
    fn attach_media(&mut self, media: Arc<dyn MediaSink>) -> Result<()>;

    /// Release every resource held by the engine. Events emitted after this
    /// call are ignored by the core.
    fn destroy(&mut self);
}

/// Factory for adaptive-streaming engines (hls.js on the web, a native HLS
/// stack on desktop).
pub trait StreamEngine: PlatformSendSync {
    /// Whether the runtime can host the engine at all.
    fn is_supported(&self) -> bool;

    /// Create a new engine bound to `events`. Manifest-ready and error
    /// notifications for this handle must be reported through that sender.
    fn create(&self, options: &EngineOptions, events: SessionEvents)
        -> Result<Box<dyn EngineHandle>>;
}

/// Native media element used for direct playback and as the render target of
/// the adaptive engine.
pub trait MediaSink: PlatformSendSync {
    /// Whether the sink can play the given MIME type natively.
    fn can_play_type(&self, mime: &str) -> bool;

    /// Point the sink at a URL. An error means the sink refuses the source
    /// outright.
    fn set_src(&self, url: &str) -> Result<()>;

    /// Begin playback. Must not block: a rejection is reported later through
    /// [`SessionEvents::play_rejected`].
    fn play(&self, events: SessionEvents);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn engine_options_default_buffer() {
        assert_eq!(
            EngineOptions::default().max_buffer_length,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn session_events_stamp_generation_and_origin() {
        let (tx, mut rx) = unbounded_channel();
        let events = SessionEvents::new(7, EventOrigin::Engine, tx);

        assert!(events.manifest_parsed());
        assert!(events.error(EngineError::fatal(EngineErrorKind::Network, "manifestLoadError")));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.generation, 7);
        assert_eq!(first.origin, EventOrigin::Engine);
        assert_eq!(first.event, SessionEvent::ManifestParsed);

        let second = rx.try_recv().unwrap();
        match second.event {
            SessionEvent::EngineError(err) => {
                assert!(err.fatal);
                assert_eq!(err.details, "manifestLoadError");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn send_after_receiver_dropped_reports_false() {
        let (tx, rx) = unbounded_channel();
        let events = SessionEvents::new(1, EventOrigin::Media, tx);
        drop(rx);
        assert!(!events.play_rejected("NotAllowedError"));
    }
}
