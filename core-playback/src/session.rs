//! # Playback Session
//!
//! One playback attempt for one URL. A session owns at most one adaptive
//! engine handle and is identified by the generation it was started with.

use bridge_traits::EngineHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a [`PlaybackSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for the adaptive engine's manifest.
    Loading,
    /// Playing through the adaptive engine.
    Playing,
    /// A fatal error was counted and a reload is being issued.
    RetryingAfterError,
    /// Retries are exhausted and the engine is being released.
    FallingBack,
    /// Playing through the native sink.
    FallbackPlaying,
    /// No further automatic action.
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Loading => "loading",
            SessionState::Playing => "playing",
            SessionState::RetryingAfterError => "retrying_after_error",
            SessionState::FallingBack => "falling_back",
            SessionState::FallbackPlaying => "fallback_playing",
            SessionState::Failed => "failed",
        }
    }

    /// Returns `true` if adaptive-engine errors still drive transitions.
    pub fn accepts_engine_errors(&self) -> bool {
        matches!(self, SessionState::Loading | SessionState::Playing)
    }

    /// Returns `true` once media is being rendered by either path.
    pub fn is_playing(&self) -> bool {
        matches!(self, SessionState::Playing | SessionState::FallbackPlaying)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the current playback attempt.
pub struct PlaybackSession {
    generation: u64,
    url: String,
    engine: Option<Box<dyn EngineHandle>>,
    retry_count: u32,
    state: SessionState,
    loading_since: Option<DateTime<Utc>>,
}

impl PlaybackSession {
    pub(crate) fn new(generation: u64, url: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            generation,
            url: url.into(),
            engine: None,
            retry_count: 0,
            state: SessionState::Loading,
            loading_since: Some(now),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns `true` while the session still owns an engine handle.
    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// When the session last entered `Loading`, if it is still there.
    pub fn loading_since(&self) -> Option<DateTime<Utc>> {
        self.loading_since
    }

    pub(crate) fn set_state(&mut self, state: SessionState, now: DateTime<Utc>) {
        self.loading_since = (state == SessionState::Loading).then_some(now);
        self.state = state;
    }

    pub(crate) fn bind_engine(&mut self, engine: Box<dyn EngineHandle>) {
        self.engine = Some(engine);
    }

    pub(crate) fn engine_mut(&mut self) -> Option<&mut (dyn EngineHandle + 'static)> {
        self.engine.as_deref_mut()
    }

    /// Increments and returns the retry counter.
    pub(crate) fn record_retry(&mut self) -> u32 {
        self.retry_count += 1;
        self.retry_count
    }

    /// Destroys the engine handle. Returns `false` if it was already gone.
    pub(crate) fn release_engine(&mut self) -> bool {
        match self.engine.take() {
            Some(mut engine) => {
                engine.destroy();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("generation", &self.generation)
            .field("url", &self.url)
            .field("has_engine", &self.has_engine())
            .field("retry_count", &self.retry_count)
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.release_engine();
    }
}
