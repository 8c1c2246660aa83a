//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, streaming
//! engine, media element, status line, channel list widget) into the
//! playlist and playback crates. Desktop apps typically enable the
//! `desktop-shims` feature, which supplies a reqwest-backed `HttpClient`
//! when none is injected.
//!
//! ```ignore
//! use core_playback::PlaybackConfig;
//! use core_runtime::config::CoreConfig;
//! use core_service::PlayerService;
//!
//! let config = CoreConfig::builder()
//!     .stream_engine(engine)
//!     .media_sink(video)
//!     .status_sink(status_line)
//!     .build()?;
//!
//! let mut player = PlayerService::new(config, PlaybackConfig::default(), channel_list)?;
//! player.load().await;
//! while player.controller_mut().next_event().await {}
//! ```

pub mod error;
pub mod search;
pub mod service;

pub use error::{CoreError, Result};
pub use search::SearchDebouncer;
pub use service::{ChannelListView, PlayerService};
