//! # Playback Module
//!
//! Resilient playback of one live channel at a time.
//!
//! ## Overview
//!
//! This module handles:
//! - Session lifecycle with a generation fence against stale callbacks
//! - Adaptive-engine loading with a bounded retry budget
//! - Fallback to the native media sink once retries are exhausted
//! - Status reporting (one update per transition) and event-bus mirroring
//!
//! The adaptive engine and the native player are host capabilities
//! ([`StreamEngine`](bridge_traits::StreamEngine),
//! [`MediaSink`](bridge_traits::MediaSink)); this crate never decodes media.
//!
//! ```ignore
//! use core_playback::{PlaybackConfig, PlaybackController};
//!
//! let mut controller = PlaybackController::new(
//!     PlaybackConfig::default(),
//!     engine,
//!     video_element,
//!     status_line,
//! )?;
//!
//! controller.select("https://cdn.example.com/live/index.m3u8");
//! while controller.next_event().await {
//!     controller.tick();
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod session;

pub use config::PlaybackConfig;
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use session::{PlaybackSession, SessionState};
