//! # Host Bridge Traits
//!
//! Capability contracts that each host platform must implement.
//!
//! ## Overview
//!
//! This crate defines the boundary between the playlist/playback core and
//! the host runtime. Everything the core cannot do by itself (fetch a
//! document, decode HLS, drive a media element, show a status line) is a
//! trait here; the core only ever talks to these traits.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Fetch the playlist document
//!
//! ### Playback
//! - [`StreamEngine`](playback::StreamEngine) / [`EngineHandle`](playback::EngineHandle) -
//!   Adaptive-streaming engine (hls.js or a native HLS stack)
//! - [`MediaSink`](playback::MediaSink) - Native media element used for direct and
//!   fallback playback
//! - [`SessionEvents`](playback::SessionEvents) - Generation-tagged sender through which
//!   engine and media completions are reported
//!
//! ### UI
//! - [`StatusSink`](status::StatusSink) - One human-readable status per transition
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | HTTP only |
//! | Web      | TBD                 | Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! use core_runtime::error::Error;
//!
//! let engine = builder.stream_engine
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "StreamEngine".to_string(),
//!         message: "No adaptive streaming engine provided.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should convert platform-specific errors to `BridgeError`
//! and keep messages actionable.
//!
//! ## Thread Safety
//!
//! Native builds require `Send + Sync` on capabilities; on `wasm32` those
//! bounds are dropped (see [`platform`]).

pub mod error;
pub mod http;
pub mod platform;
pub mod playback;
pub mod status;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use playback::{
    EngineError, EngineErrorKind, EngineHandle, EngineOptions, EventOrigin, MediaSink,
    SessionEvent, SessionEvents, SessionMessage, StreamEngine, HLS_MIME_TYPE,
};
pub use status::{StatusSink, StatusUpdate};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
