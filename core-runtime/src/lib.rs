//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the playlist and playback
//! crates:
//! - Logging and tracing infrastructure
//! - Configuration and capability wiring
//! - Event bus for playlist and playback notifications
//!
//! ## Overview
//!
//! Nothing in this crate knows how a playlist is parsed or how a stream is
//! played. It establishes the logging conventions, the fail-fast bridge
//! validation, and the broadcast channel other modules publish on.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
