//! # Playback Controller
//!
//! Owns the single current [`PlaybackSession`] and runs its
//! load → retry → fallback state machine.
//!
//! ## Overview
//!
//! ```text
//!            select(url)
//!                │
//!     ┌──────────┴───────────┬──────────────────────┐
//!     │ engine supported     │ native HLS only      │ neither
//!     ▼                      ▼                      ▼
//!  Loading ──manifest──► Playing              Failed
//!     ▲  │                  │
//!     │  └──fatal──┬────────┘
//!     │            ▼
//!     └──── RetryingAfterError (retry_count < max_retries)
//!                  │ exhausted
//!                  ▼
//!             FallingBack ──► FallbackPlaying ──rejected──► Failed
//! ```
//!
//! ## Event delivery
//!
//! Engine and media completions are posted as [`SessionMessage`]s on an
//! unbounded channel owned by the controller. Every sender is stamped with
//! the generation of the session it was handed to, and a message is applied
//! only while that generation is current. Engine-origin messages are also
//! dropped once the session has released its engine handle. Only a rejection
//! of the native `play()` issued in fallback mode ends a session; rejections
//! of the adaptive-mode `play()` are logged and ignored.
//!
//! The host drives delivery with [`PlaybackController::pump`] (non-blocking)
//! or [`PlaybackController::next_event`] (async).

use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::session::{PlaybackSession, SessionState};
use bridge_traits::{
    Clock, EngineErrorKind, EventOrigin, MediaSink, SessionEvent, SessionEvents, SessionMessage,
    StatusSink, StatusUpdate, StreamEngine, SystemClock,
};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use core_runtime::logging::strip_url_query;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

/// Drives playback of one channel at a time.
pub struct PlaybackController {
    config: PlaybackConfig,
    engine: Arc<dyn StreamEngine>,
    media: Arc<dyn MediaSink>,
    status: Arc<dyn StatusSink>,
    clock: Arc<dyn Clock>,
    event_bus: Option<EventBus>,
    tx: UnboundedSender<SessionMessage>,
    rx: UnboundedReceiver<SessionMessage>,
    generation: u64,
    session: Option<PlaybackSession>,
}

impl PlaybackController {
    /// Creates a controller with no active session.
    ///
    /// Returns [`PlaybackError::InvalidConfig`] if `config` fails validation.
    pub fn new(
        config: PlaybackConfig,
        engine: Arc<dyn StreamEngine>,
        media: Arc<dyn MediaSink>,
        status: Arc<dyn StatusSink>,
    ) -> Result<Self> {
        config.validate()?;
        let (tx, rx) = unbounded_channel();

        Ok(Self {
            config,
            engine,
            media,
            status,
            clock: Arc::new(SystemClock),
            event_bus: None,
            tx,
            rx,
            generation: 0,
            session: None,
        })
    }

    /// Replaces the time source used for the manifest timeout.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Mirrors session lifecycle events onto `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Generation of the current session, or of the last one torn down.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> Option<SessionState> {
        self.session.as_ref().map(PlaybackSession::state)
    }

    pub fn current_url(&self) -> Option<&str> {
        self.session.as_ref().map(PlaybackSession::url)
    }

    pub fn retry_count(&self) -> u32 {
        self.session
            .as_ref()
            .map_or(0, PlaybackSession::retry_count)
    }

    /// Starts playing `url`, replacing any current session.
    ///
    /// Progress is reported through the status sink; there is no return
    /// value to wait on.
    pub fn select(&mut self, url: &str) {
        self.teardown();
        self.generation += 1;
        let generation = self.generation;

        info!(
            generation,
            url = %strip_url_query(url),
            "Starting playback session"
        );

        self.session = Some(PlaybackSession::new(generation, url, self.clock.now()));
        self.emit(PlaybackEvent::SessionStarted {
            generation,
            url: strip_url_query(url).to_string(),
        });
        self.emit_state(SessionState::Loading);
        self.publish(StatusUpdate::Loading);

        if self.engine.is_supported() {
            let events = self.session_events(EventOrigin::Engine);
            match self.engine.create(&self.config.engine, events) {
                Ok(handle) => {
                    if let Some(session) = self.session.as_mut() {
                        session.bind_engine(handle);
                    }
                    self.load_adaptive();
                    return;
                }
                Err(e) => {
                    warn!(
                        generation,
                        error = %PlaybackError::EngineUnavailable(e.to_string()),
                        "Streaming engine creation failed; trying native playback"
                    );
                }
            }
        }

        if self.media.can_play_type(&self.config.native_mime_type) {
            debug!(generation, "Adaptive engine unavailable; using native playback");
            self.play_native();
        } else {
            self.fail(PlaybackError::UnsupportedFormat(
                self.config.native_mime_type.clone(),
            ));
        }
    }

    /// Ends the current session without starting another.
    pub fn stop(&mut self) {
        if self.session.is_some() {
            info!(generation = self.generation, "Stopping playback session");
        }
        self.teardown();
        self.generation += 1;
    }

    /// Applies one message through the generation fence.
    ///
    /// Returns `true` if the message reached the state machine.
    pub fn dispatch(&mut self, message: SessionMessage) -> bool {
        let Some(session) = self.session.as_ref() else {
            debug!(generation = message.generation, "Dropping message: no session");
            return false;
        };

        if message.generation != session.generation() {
            debug!(
                generation = message.generation,
                current = session.generation(),
                "Dropping message from superseded session"
            );
            return false;
        }

        if message.origin == EventOrigin::Engine && !session.has_engine() {
            debug!(
                generation = message.generation,
                "Dropping engine message after engine release"
            );
            return false;
        }

        let state = session.state();
        match message.event {
            SessionEvent::ManifestParsed if state == SessionState::Loading => {
                self.on_manifest_parsed();
            }
            SessionEvent::EngineError(err) if !err.fatal => {
                warn!(
                    generation = message.generation,
                    kind = ?err.kind,
                    details = %err.details,
                    "Non-fatal stream error"
                );
            }
            SessionEvent::EngineError(err) if state.accepts_engine_errors() => {
                self.on_fatal(PlaybackError::FatalStream {
                    kind: err.kind,
                    details: err.details,
                });
            }
            SessionEvent::PlayRejected { reason } if message.origin == EventOrigin::Media => {
                // The engine keeps driving the element; a refused autoplay is not fatal.
                debug!(
                    generation = message.generation,
                    state = %state,
                    reason = %reason,
                    "Ignoring rejection of adaptive-mode play"
                );
                return false;
            }
            SessionEvent::PlayRejected { reason }
                if message.origin == EventOrigin::Fallback
                    && state == SessionState::FallbackPlaying =>
            {
                self.fail(PlaybackError::NativePlaybackRejected(reason));
            }
            event => {
                debug!(
                    generation = message.generation,
                    state = %state,
                    event = ?event,
                    "Ignoring message in current state"
                );
                return false;
            }
        }

        true
    }

    /// Dispatches every queued message without waiting.
    ///
    /// Returns the number of messages taken off the queue.
    pub fn pump(&mut self) -> usize {
        let mut received = 0;
        while let Ok(message) = self.rx.try_recv() {
            received += 1;
            self.dispatch(message);
        }
        received
    }

    /// Waits for the next message and dispatches it.
    ///
    /// Returns `false` if the channel is closed.
    pub async fn next_event(&mut self) -> bool {
        match self.rx.recv().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Enforces the manifest timeout, if configured.
    ///
    /// Returns `true` if the current session timed out on this call.
    pub fn tick(&mut self) -> bool {
        let Some(timeout) = self.config.manifest_timeout else {
            return false;
        };
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let Some(since) = session.loading_since() else {
            return false;
        };
        if session.state() != SessionState::Loading || !session.has_engine() {
            return false;
        }
        if self.clock.elapsed_since(since) < timeout {
            return false;
        }

        warn!(
            generation = session.generation(),
            timeout_ms = timeout.as_millis() as u64,
            "Manifest timeout elapsed"
        );
        self.on_fatal(PlaybackError::ManifestTimeout(timeout));
        true
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn on_manifest_parsed(&mut self) {
        info!(generation = self.generation, "Manifest parsed; starting playback");
        self.set_state(SessionState::Playing);
        self.publish(StatusUpdate::Playing);
        self.media.play(self.session_events(EventOrigin::Media));
    }

    fn on_fatal(&mut self, error: PlaybackError) {
        let max_retries = self.config.max_retries;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let generation = session.generation();

        if session.retry_count() < max_retries {
            let attempt = session.record_retry();
            warn!(
                generation,
                attempt,
                max_retries,
                error = %error,
                "Fatal stream error; reloading"
            );
            self.set_state(SessionState::RetryingAfterError);
            self.publish(StatusUpdate::Retrying {
                attempt,
                max: max_retries,
            });
            self.emit(PlaybackEvent::Retrying {
                generation,
                attempt,
                max_retries,
            });
            self.set_state(SessionState::Loading);
            self.load_adaptive();
        } else {
            warn!(
                generation,
                error = %error,
                "Retries exhausted; falling back to native playback"
            );
            self.release_engine();
            self.set_state(SessionState::FallingBack);
            self.publish(StatusUpdate::FallingBack);
            self.emit(PlaybackEvent::FellBack { generation });
            self.play_native();
        }
    }

    /// Issues `load_source` + `attach_media` on the session's engine.
    fn load_adaptive(&mut self) {
        let media = Arc::clone(&self.media);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let url = session.url().to_string();
        let Some(engine) = session.engine_mut() else {
            return;
        };

        let loaded = match engine.load_source(&url) {
            Ok(()) => engine.attach_media(media),
            Err(e) => Err(e),
        };

        if let Err(e) = loaded {
            self.on_fatal(PlaybackError::FatalStream {
                kind: EngineErrorKind::Other,
                details: e.to_string(),
            });
        }
    }

    fn play_native(&mut self) {
        let Some(url) = self.current_url().map(str::to_string) else {
            return;
        };

        if let Err(e) = self.media.set_src(&url) {
            self.fail(PlaybackError::SourceRejected(e.to_string()));
            return;
        }

        self.set_state(SessionState::FallbackPlaying);
        self.publish(StatusUpdate::FallbackPlaying);
        self.media.play(self.session_events(EventOrigin::Fallback));
    }

    fn fail(&mut self, error: PlaybackError) {
        let generation = self.generation;
        error!(generation, error = %error, "Playback session failed");

        self.release_engine();
        self.set_state(SessionState::Failed);
        let message = error.user_message();
        self.publish(StatusUpdate::Failed {
            message: message.clone(),
        });
        self.emit(PlaybackEvent::Failed {
            generation,
            message,
        });
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn teardown(&mut self) {
        self.release_engine();
        self.session = None;
    }

    fn release_engine(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.release_engine() {
            let generation = session.generation();
            debug!(generation, "Streaming engine released");
            self.emit(PlaybackEvent::EngineReleased { generation });
        }
    }

    fn set_state(&mut self, state: SessionState) {
        let now = self.clock.now();
        if let Some(session) = self.session.as_mut() {
            session.set_state(state, now);
            self.emit_state(state);
        }
    }

    fn emit_state(&self, state: SessionState) {
        debug!(generation = self.generation, state = %state, "Session state changed");
        self.emit(PlaybackEvent::StateChanged {
            generation: self.generation,
            state: state.to_string(),
        });
    }

    fn session_events(&self, origin: EventOrigin) -> SessionEvents {
        SessionEvents::new(self.generation, origin, self.tx.clone())
    }

    fn publish(&self, update: StatusUpdate) {
        self.status.publish(update);
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.event_bus {
            // No subscribers is fine.
            let _ = bus.emit(CoreEvent::Playback(event));
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("config", &self.config)
            .field("generation", &self.generation)
            .field("session", &self.session)
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{BridgeError, EngineHandle, EngineOptions};
    use std::sync::Mutex;

    struct Unsupported;

    impl StreamEngine for Unsupported {
        fn is_supported(&self) -> bool {
            false
        }

        fn create(
            &self,
            _options: &EngineOptions,
            _events: SessionEvents,
        ) -> std::result::Result<Box<dyn EngineHandle>, BridgeError> {
            Err(BridgeError::NotAvailable("no MSE".into()))
        }
    }

    #[derive(Default)]
    struct NativeSink {
        supports_hls: bool,
        sources: Mutex<Vec<String>>,
    }

    impl MediaSink for NativeSink {
        fn can_play_type(&self, _mime: &str) -> bool {
            self.supports_hls
        }

        fn set_src(&self, url: &str) -> std::result::Result<(), BridgeError> {
            self.sources.lock().unwrap().push(url.to_string());
            Ok(())
        }

        fn play(&self, _events: SessionEvents) {}
    }

    fn controller(sink: Arc<NativeSink>) -> (PlaybackController, Arc<Mutex<Vec<StatusUpdate>>>) {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let recorder = updates.clone();
        let controller = PlaybackController::new(
            PlaybackConfig::default(),
            Arc::new(Unsupported),
            sink,
            Arc::new(move |update: StatusUpdate| recorder.lock().unwrap().push(update)),
        )
        .unwrap();
        (controller, updates)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = PlaybackController::new(
            PlaybackConfig::default().with_max_retries(50),
            Arc::new(Unsupported),
            Arc::new(NativeSink::default()),
            Arc::new(|_update: StatusUpdate| {}),
        );
        assert!(matches!(result, Err(PlaybackError::InvalidConfig(_))));
    }

    #[test]
    fn test_idle_controller_introspection() {
        let (controller, _) = controller(Arc::new(NativeSink::default()));
        assert_eq!(controller.generation(), 0);
        assert_eq!(controller.state(), None);
        assert_eq!(controller.current_url(), None);
        assert_eq!(controller.retry_count(), 0);
    }

    #[test]
    fn test_native_only_path() {
        let sink = Arc::new(NativeSink {
            supports_hls: true,
            ..Default::default()
        });
        let (mut controller, updates) = controller(sink.clone());

        controller.select("http://x/a.m3u8");

        assert_eq!(controller.state(), Some(SessionState::FallbackPlaying));
        assert_eq!(*sink.sources.lock().unwrap(), ["http://x/a.m3u8"]);
        assert_eq!(
            *updates.lock().unwrap(),
            [StatusUpdate::Loading, StatusUpdate::FallbackPlaying]
        );
    }

    #[test]
    fn test_message_without_session_is_dropped() {
        let (mut controller, _) = controller(Arc::new(NativeSink::default()));
        let delivered = controller.dispatch(SessionMessage {
            generation: 0,
            origin: EventOrigin::Media,
            event: SessionEvent::PlayRejected {
                reason: "x".into(),
            },
        });
        assert!(!delivered);
    }

    #[test]
    fn test_stop_advances_generation() {
        let sink = Arc::new(NativeSink {
            supports_hls: true,
            ..Default::default()
        });
        let (mut controller, _) = controller(sink);
        controller.select("http://x/a.m3u8");
        let generation = controller.generation();

        controller.stop();
        assert_eq!(controller.generation(), generation + 1);
        assert!(controller.session().is_none());
    }
}
