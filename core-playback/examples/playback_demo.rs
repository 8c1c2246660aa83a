//! # Playback Controller Example
//!
//! Drives a `PlaybackController` against a scripted engine that fails the
//! first manifest request and then succeeds, printing every status update.
//!
//! Run with: `cargo run --example playback_demo --package core-playback`

use anyhow::Result;
use bridge_traits::{
    BridgeError, EngineError, EngineErrorKind, EngineHandle, EngineOptions, MediaSink,
    SessionEvents, StatusUpdate, StreamEngine,
};
use bridge_traits::time::LogLevel;
use core_playback::{PlaybackConfig, PlaybackController};
use core_runtime::logging::{init_logging, LoggingConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Scripted engine
// ============================================================================

/// Reports a fatal network error for the first `failures` loads, then a
/// parsed manifest.
struct ScriptedEngine {
    failures: u32,
}

struct ScriptedHandle {
    events: SessionEvents,
    remaining_failures: Arc<AtomicU32>,
}

impl StreamEngine for ScriptedEngine {
    fn is_supported(&self) -> bool {
        true
    }

    fn create(
        &self,
        options: &EngineOptions,
        events: SessionEvents,
    ) -> std::result::Result<Box<dyn EngineHandle>, BridgeError> {
        println!(
            "[engine] created for generation {} (buffer {:?})",
            events.generation(),
            options.max_buffer_length
        );
        Ok(Box::new(ScriptedHandle {
            events,
            remaining_failures: Arc::new(AtomicU32::new(self.failures)),
        }))
    }
}

impl EngineHandle for ScriptedHandle {
    fn load_source(&mut self, url: &str) -> std::result::Result<(), BridgeError> {
        println!("[engine] load {url}");
        let events = self.events.clone();
        let fail = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if fail {
                events.error(EngineError::fatal(
                    EngineErrorKind::Network,
                    "manifestLoadError",
                ));
            } else {
                events.manifest_parsed();
            }
        });
        Ok(())
    }

    fn attach_media(&mut self, _media: Arc<dyn MediaSink>) -> std::result::Result<(), BridgeError> {
        Ok(())
    }

    fn destroy(&mut self) {
        println!("[engine] destroyed");
    }
}

struct ConsoleVideo;

impl MediaSink for ConsoleVideo {
    fn can_play_type(&self, _mime: &str) -> bool {
        true
    }

    fn set_src(&self, url: &str) -> std::result::Result<(), BridgeError> {
        println!("[video] src = {url}");
        Ok(())
    }

    fn play(&self, _events: SessionEvents) {
        println!("[video] play()");
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(LoggingConfig::default().with_level(LogLevel::Debug))?;

    let mut controller = PlaybackController::new(
        PlaybackConfig::default(),
        Arc::new(ScriptedEngine { failures: 1 }),
        Arc::new(ConsoleVideo),
        Arc::new(|update: StatusUpdate| println!("[status] {update:?} \"{update}\"")),
    )?;

    controller.select("https://cdn.example.com/live/news/index.m3u8");

    while !controller
        .state()
        .map_or(true, |state| state.is_playing() || state.is_terminal())
    {
        controller.next_event().await;
    }

    println!("Final state: {:?}", controller.state());
    controller.stop();
    Ok(())
}
