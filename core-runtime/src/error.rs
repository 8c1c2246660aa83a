use thiserror::Error;

/// Failures while wiring the runtime together. None of these can happen once
/// a player is running.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is out of range or malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A required host bridge was not supplied.
    #[error("Missing {capability} bridge: {message}")]
    CapabilityMissing { capability: String, message: String },

    /// The tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl Error {
    pub fn is_capability_missing(&self) -> bool {
        matches!(self, Error::CapabilityMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
