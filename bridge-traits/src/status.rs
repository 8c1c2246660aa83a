//! Status contract between the core and the host UI.
//!
//! The core publishes exactly one [`StatusUpdate`] per transition, in the
//! order transitions happen. Hosts typically render the `Display` text into a
//! status line and clear it on [`StatusUpdate::is_cleared`].

use crate::platform::PlatformSendSync;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable progress or result of a playlist load or playback session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusUpdate {
    /// Channel list is being fetched.
    LoadingChannels,
    /// The playlist was fetched but contained no playable channels.
    NoChannels,
    /// The playlist could not be fetched.
    ChannelsUnavailable { message: String },
    /// Nothing to report.
    Cleared,
    /// A playback session started loading.
    Loading,
    /// Media is playing through the adaptive engine.
    Playing,
    /// A fatal engine error triggered a reload.
    Retrying { attempt: u32, max: u32 },
    /// Retries are exhausted; switching to native playback.
    FallingBack,
    /// Media is playing through the native sink.
    FallbackPlaying,
    /// The session ended without playback.
    Failed { message: String },
}

impl StatusUpdate {
    /// Whether the host should clear its status line.
    pub fn is_cleared(&self) -> bool {
        matches!(self, StatusUpdate::Cleared | StatusUpdate::Playing)
    }

    /// Whether this update reports a failure the user should see.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StatusUpdate::Failed { .. } | StatusUpdate::ChannelsUnavailable { .. }
        )
    }
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusUpdate::LoadingChannels => f.write_str("loading channel list"),
            StatusUpdate::NoChannels => f.write_str("no channels found"),
            StatusUpdate::ChannelsUnavailable { message } => {
                write!(f, "failed to load channels: {message}")
            }
            StatusUpdate::Cleared => Ok(()),
            StatusUpdate::Loading => f.write_str("loading"),
            StatusUpdate::Playing => f.write_str("playing"),
            StatusUpdate::Retrying { attempt, max } => write!(f, "retrying ({attempt}/{max})"),
            StatusUpdate::FallingBack => f.write_str("falling back"),
            StatusUpdate::FallbackPlaying => f.write_str(
                "playing (fallback); if the picture stays blank the stream may block \
                 cross-origin access or may not be HLS",
            ),
            StatusUpdate::Failed { message } => f.write_str(message),
        }
    }
}

/// Receiver of status updates (status line, toast, accessibility live region).
pub trait StatusSink: PlatformSendSync {
    fn publish(&self, update: StatusUpdate);
}

impl<F> StatusSink for F
where
    F: Fn(StatusUpdate) + PlatformSendSync,
{
    fn publish(&self, update: StatusUpdate) {
        self(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn retry_status_renders_attempt_counter() {
        let update = StatusUpdate::Retrying { attempt: 1, max: 2 };
        assert_eq!(update.to_string(), "retrying (1/2)");
    }

    #[test]
    fn cleared_variants() {
        assert!(StatusUpdate::Playing.is_cleared());
        assert!(StatusUpdate::Cleared.is_cleared());
        assert!(!StatusUpdate::Loading.is_cleared());
        assert_eq!(StatusUpdate::Cleared.to_string(), "");
    }

    #[test]
    fn closures_are_status_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |update: StatusUpdate| seen.lock().unwrap().push(update)
        };

        sink.publish(StatusUpdate::FallingBack);
        assert_eq!(seen.lock().unwrap().as_slice(), &[StatusUpdate::FallingBack]);
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_string(&StatusUpdate::Retrying { attempt: 2, max: 2 }).unwrap();
        assert_eq!(json, r#"{"status":"retrying","attempt":2,"max":2}"#);
    }
}
