//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map to the individual workspace
//! crates (`core-service`, `core-playlist`, `core-playback`). Host
//! applications can depend on `iptv-workspace` and enable the documented
//! features without wiring each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service;

#[cfg(feature = "playlist-only")]
pub use core_playlist;

#[cfg(feature = "playback-only")]
pub use core_playback;
