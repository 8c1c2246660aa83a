//! # Playback Configuration
//!
//! Retry budget, engine options and native fallback settings for the
//! playback controller.

use crate::error::{PlaybackError, Result};
use bridge_traits::{EngineOptions, HLS_MIME_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Reloads attempted after fatal engine errors before falling back to
    /// native playback.
    ///
    /// Default: 2.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Options handed to the adaptive engine on creation.
    ///
    /// Default: 30 s forward buffer.
    #[serde(default)]
    pub engine: EngineOptions,

    /// MIME type checked against the native sink when the adaptive engine is
    /// unavailable.
    ///
    /// Default: `application/vnd.apple.mpegurl`.
    #[serde(default = "default_native_mime_type")]
    pub native_mime_type: String,

    /// Maximum time a session may stay `Loading` before [`tick`] treats it
    /// as a fatal error. `None` waits forever.
    ///
    /// Default: `None`.
    ///
    /// [`tick`]: crate::PlaybackController::tick
    #[serde(default)]
    pub manifest_timeout: Option<Duration>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            engine: EngineOptions::default(),
            native_mime_type: default_native_mime_type(),
            manifest_timeout: None,
        }
    }
}

impl PlaybackConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_buffer_length(mut self, length: Duration) -> Self {
        self.engine.max_buffer_length = length;
        self
    }

    pub fn with_manifest_timeout(mut self, timeout: Duration) -> Self {
        self.manifest_timeout = Some(timeout);
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries > 10 {
            return Err(PlaybackError::InvalidConfig(
                "max_retries cannot exceed 10".to_string(),
            ));
        }

        if self.engine.max_buffer_length.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "engine.max_buffer_length must be > 0".to_string(),
            ));
        }

        if self.native_mime_type.trim().is_empty() {
            return Err(PlaybackError::InvalidConfig(
                "native_mime_type cannot be empty".to_string(),
            ));
        }

        if matches!(self.manifest_timeout, Some(timeout) if timeout.is_zero()) {
            return Err(PlaybackError::InvalidConfig(
                "manifest_timeout must be > 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_max_retries() -> u32 {
    2
}

fn default_native_mime_type() -> String {
    HLS_MIME_TYPE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaybackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.engine.max_buffer_length, Duration::from_secs(30));
        assert_eq!(config.native_mime_type, "application/vnd.apple.mpegurl");
        assert_eq!(config.manifest_timeout, None);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PlaybackConfig::default();

        config.max_retries = 11;
        assert!(config.validate().is_err());
        config.max_retries = 0;
        assert!(config.validate().is_ok());

        config.engine.max_buffer_length = Duration::ZERO;
        assert!(config.validate().is_err());
        config.engine.max_buffer_length = Duration::from_secs(10);

        config.native_mime_type = "  ".to_string();
        assert!(config.validate().is_err());
        config.native_mime_type = HLS_MIME_TYPE.to_string();

        config.manifest_timeout = Some(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(PlaybackError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builder_helpers() {
        let config = PlaybackConfig::default()
            .with_max_retries(4)
            .with_max_buffer_length(Duration::from_secs(60))
            .with_manifest_timeout(Duration::from_secs(15));

        assert_eq!(config.max_retries, 4);
        assert_eq!(config.engine.max_buffer_length, Duration::from_secs(60));
        assert_eq!(config.manifest_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: PlaybackConfig = serde_json::from_str(r#"{"max_retries": 1}"#).unwrap();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.native_mime_type, HLS_MIME_TYPE);
        assert_eq!(config.engine, EngineOptions::default());
    }
}
