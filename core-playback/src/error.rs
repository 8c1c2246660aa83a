//! # Playback Error Types
//!
//! Errors raised while driving a playback session.
//!
//! None of these escape [`PlaybackController`](crate::PlaybackController)
//! during normal operation: each one becomes a state transition plus a
//! status message built from [`PlaybackError::user_message`]. Only
//! configuration errors are returned to the caller.

use bridge_traits::EngineErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Neither the adaptive engine nor the native sink can play the stream.
    #[error("Unsupported stream format: {0}")]
    UnsupportedFormat(String),

    /// The adaptive engine reported support but could not be created.
    #[error("Streaming engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The adaptive engine reported a fatal error.
    #[error("Fatal stream error ({kind:?}): {details}")]
    FatalStream {
        kind: EngineErrorKind,
        details: String,
    },

    /// No manifest arrived within the configured window.
    #[error("Manifest not received within {0:?}")]
    ManifestTimeout(Duration),

    /// The native player refused to start (autoplay policy, decode error).
    #[error("Native playback rejected: {0}")]
    NativePlaybackRejected(String),

    /// The native player refused the source URL.
    #[error("Stream source rejected: {0}")]
    SourceRejected(String),

    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),
}

impl PlaybackError {
    /// Message shown in the status line.
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::UnsupportedFormat(_) => {
                "This stream format is not supported on this device".to_string()
            }
            PlaybackError::EngineUnavailable(_) => "Streaming engine unavailable".to_string(),
            PlaybackError::FatalStream { .. } => "The stream could not be loaded".to_string(),
            PlaybackError::ManifestTimeout(_) => "The stream did not respond in time".to_string(),
            PlaybackError::NativePlaybackRejected(reason) => {
                format!("Playback could not start: {reason}")
            }
            PlaybackError::SourceRejected(_) => "The player could not open this stream".to_string(),
            PlaybackError::InvalidConfig(reason) => {
                format!("Invalid playback configuration: {reason}")
            }
        }
    }

    /// Returns `true` if the error feeds the retry/fallback ladder.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlaybackError::FatalStream { .. } | PlaybackError::ManifestTimeout(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
