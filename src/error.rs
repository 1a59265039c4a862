//! Error types for the look-ahead cache

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the look-ahead cache and its workers
#[derive(Error, Debug)]
pub enum Error {
    /// The cache was terminated while (or before) waiting for a job
    #[error("Look-ahead cache terminated")]
    Terminated,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker thread panicked
    #[error("Worker thread '{0}' panicked")]
    WorkerPanicked(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if this error is the shutdown signal rather than a failure
    pub fn is_terminated(&self) -> bool {
        matches!(self, Error::Terminated)
    }
}
