//! # Logging & Tracing Infrastructure
//!
//! Structured logging with the `tracing` crate:
//! - Pretty, JSON and compact output
//! - Per-crate level directives, overridable from the environment
//! - A scrubbed copy of every event forwarded to the host `LoggerSink`
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use bridge_traits::time::{ConsoleLogger, LogLevel};
//! use std::sync::Arc;
//!
//! let config = LoggingConfig::from_env()?
//!     .with_level(LogLevel::Debug)
//!     .with_host_sink(Arc::new(ConsoleLogger::default()));
//!
//! init_logging(config)?;
//! tracing::info!("Player started");
//! ```
//!
//! ## Stream URLs
//!
//! IPTV stream URLs frequently embed credentials in the query string. Log
//! them through [`strip_url_query`]:
//!
//! ```ignore
//! tracing::info!(url = %strip_url_query(url), "Starting playback session");
//! ```
//!
//! Fields forwarded to the host sink are scrubbed automatically: any field
//! whose name ends in `url` loses its query, and credential-like field names
//! are replaced by `[REDACTED]`.

use crate::error::{Error, Result};

use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::format::FmtSpan,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer, Registry,
};

/// Environment variable holding filter directives, `RUST_LOG` syntax.
pub const LOG_DIRECTIVES_ENV: &str = "IPTV_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "IPTV_LOG_FORMAT";

/// Crates whose level follows [`LoggingConfig::level`] in the default filter.
const WORKSPACE_CRATES: &[&str] = &[
    "core_runtime",
    "core_playlist",
    "core_playback",
    "core_service",
    "bridge_desktop",
];

const SENSITIVE_FIELDS: &[&str] = &[
    "token",
    "password",
    "passwd",
    "secret",
    "api_key",
    "authorization",
    "signature",
];

/// Output format of the stdout layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, coloured; for development.
    Pretty,
    /// One JSON object per event.
    Json,
    /// Single-line text.
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(Error::Config(format!(
                "Unknown log format {other:?}; expected pretty, json or compact"
            ))),
        }
    }
}

/// Logging setup for a player process.
#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level applied to the workspace crates when no directives are given.
    pub level: LogLevel,
    /// Directive string replacing the per-crate defaults,
    /// e.g. `core_playback=trace,core_playlist=debug`.
    pub directives: Option<String>,
    /// Host logger receiving a scrubbed copy of every event.
    pub host_sink: Option<Arc<dyn LoggerSink>>,
    /// Print span open and close events.
    pub span_events: bool,
    /// Include targets and thread names in formatted output.
    pub verbose_metadata: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            directives: None,
            host_sink: None,
            span_events: false,
            verbose_metadata: false,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("directives", &self.directives)
            .field("host_sink", &self.host_sink.is_some())
            .field("span_events", &self.span_events)
            .field("verbose_metadata", &self.verbose_metadata)
            .finish()
    }
}

impl LoggingConfig {
    /// Defaults overridden by [`LOG_DIRECTIVES_ENV`] and [`LOG_FORMAT_ENV`]
    /// when they are set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the format variable names no known format.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(directives) = lookup(LOG_DIRECTIVES_ENV).filter(|d| !d.trim().is_empty()) {
            config.directives = Some(directives);
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            config.format = format.parse()?;
        }
        Ok(config)
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    pub fn with_host_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.host_sink = Some(sink);
        self
    }

    pub fn with_span_events(mut self, enable: bool) -> Self {
        self.span_events = enable;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose_metadata = true;
        self
    }
}

/// Installs the global subscriber: the configured formatter, the level
/// filter and, when a sink is set, the host forwarding layer.
///
/// Call once at startup.
///
/// # Errors
///
/// Returns [`Error::Config`] for an invalid directive string and
/// [`Error::Logging`] if a global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    tracing_subscriber::registry()
        .with(build_format_layer(&config))
        .with(filter)
        .with(HostLogLayer::new(config.host_sink))
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = match &config.directives {
        Some(custom) => custom.clone(),
        None => default_directives(config.level),
    };

    EnvFilter::try_new(&directives)
        .map_err(|e| Error::Config(format!("Invalid log directives {directives:?}: {e}")))
}

/// Our crates at `level`, the HTTP stack at warn.
fn default_directives(level: LogLevel) -> String {
    let level = level.as_str();
    WORKSPACE_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .chain(["h2=warn", "hyper=warn", "reqwest=warn"].map(String::from))
        .collect::<Vec<_>>()
        .join(",")
}

type FormatLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn build_format_layer(config: &LoggingConfig) -> FormatLayer {
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let base = tracing_subscriber::fmt::layer()
        .with_target(config.verbose_metadata)
        .with_thread_names(config.verbose_metadata)
        .with_writer(io::stdout);

    match config.format {
        LogFormat::Pretty => base.pretty().with_span_events(span_events).boxed(),
        LogFormat::Json => base
            .json()
            .flatten_event(true)
            .with_current_span(config.span_events)
            .with_span_list(false)
            .boxed(),
        LogFormat::Compact => base.compact().with_span_events(span_events).boxed(),
    }
}

/// Mirrors filtered events into the host [`LoggerSink`], with credentials
/// scrubbed from field values.
struct HostLogLayer {
    sink: Option<Arc<dyn LoggerSink>>,
}

impl HostLogLayer {
    fn new(sink: Option<Arc<dyn LoggerSink>>) -> Self {
        Self { sink }
    }
}

impl<S> Layer<S> for HostLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };

        let metadata = event.metadata();
        let level = to_log_level(*metadata.level());
        if level < sink.min_level() {
            return;
        }

        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let message = fields
            .message
            .take()
            .unwrap_or_else(|| metadata.name().to_string());
        let mut entry = LogEntry::new(level, metadata.target(), message);
        entry.fields = fields.values;
        entry.span_id = ctx.lookup_current().map(|span| span.name().to_string());

        let sink = Arc::clone(sink);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = sink.log(entry).await {
                        eprintln!("host logger rejected entry: {err}");
                    }
                });
            }
            Err(_) => {
                if let Err(err) = futures::executor::block_on(sink.log(entry)) {
                    eprintln!("host logger rejected entry: {err}");
                }
            }
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    values: HashMap<String, String>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            name if name.ends_with("url") => {
                self.values
                    .insert(name.to_string(), strip_url_query(&value).to_string());
            }
            name => {
                self.values
                    .insert(name.to_string(), redact_if_sensitive(name, &value));
            }
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }
}

fn to_log_level(level: tracing::Level) -> LogLevel {
    match level {
        tracing::Level::TRACE => LogLevel::Trace,
        tracing::Level::DEBUG => LogLevel::Debug,
        tracing::Level::INFO => LogLevel::Info,
        tracing::Level::WARN => LogLevel::Warn,
        tracing::Level::ERROR => LogLevel::Error,
    }
}

/// `[REDACTED]` if `field_name` looks like a credential, otherwise `value`.
///
/// ```ignore
/// use core_runtime::logging::redact_if_sensitive;
///
/// info!(token = %redact_if_sensitive("token", token), "Stream authorised");
/// ```
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    let name = field_name.to_ascii_lowercase();
    if SENSITIVE_FIELDS.iter().any(|sensitive| name.contains(sensitive)) {
        "[REDACTED]".to_string()
    } else {
        value.to_string()
    }
}

/// Drop the query string and fragment from a URL for logging.
///
/// ```ignore
/// use core_runtime::logging::strip_url_query;
///
/// let url = "http://line.example.tv/live/1.m3u8?username=bob&password=hunter2";
/// info!(url = %strip_url_query(url), "Loading stream");
/// // Logs: url="http://line.example.tv/live/1.m3u8"
/// ```
pub fn strip_url_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
