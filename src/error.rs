//! Error types for quote reflowing and batch cleaning

use std::path::PathBuf;
use thiserror::Error;

/// Failures inside the normalizer.
///
/// These never escape [`crate::normalize`]; they are carried inside
/// [`crate::Normalized::Fallback`] next to the untouched input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// An empty keyword would match between every character
    #[error("keyword #{index} is empty")]
    EmptyKeyword { index: usize },
}

/// Errors raised by configuration loading and the batch driver
#[derive(Error, Debug)]
pub enum CleanError {
    /// Filesystem operation failed
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for our schema
    #[error("Invalid config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Default configuration could not be serialized
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Encoding label not recognised
    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// Input bytes are not valid in the configured encoding
    #[error("Malformed input in {}: not valid {encoding}", path.display())]
    Decode { path: PathBuf, encoding: String },

    /// Output text has characters the configured encoding cannot represent
    #[error("Cannot encode {} as {encoding}: unmappable characters", path.display())]
    Encode { path: PathBuf, encoding: String },
}

impl CleanError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result type for configuration and batch operations
pub type Result<T> = std::result::Result<T, CleanError>;
