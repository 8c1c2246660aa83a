//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with rustls
//!
//! Streaming engines and media sinks are UI-toolkit specific and are always
//! injected by the host.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use bridge_traits::HttpClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::new();
//!     let playlist = http_client
//!         .get_text("https://iptv-org.github.io/iptv/index.m3u")
//!         .await;
//! }
//! ```

mod http;

pub use http::ReqwestHttpClient;
