//! Error types for the documentation generator

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an operation before or outside a documentation request.
///
/// Failures of the remote call itself are never reported through this type;
/// they are folded into [`crate::generator::DocumentResult`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to open git repository at {path}: {source}")]
    Repository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid secrets file {path}: {source}")]
    SecretsFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid temperature: {temp}. Must be between 0.0 and 2.0")]
    InvalidTemperature { temp: f32 },

    #[error("Invalid max tokens: {tokens}. Must be greater than 0")]
    InvalidMaxTokens { tokens: u32 },

    #[error("Invalid max attempts: {attempts}. Must be between 1 and 10")]
    InvalidMaxAttempts { attempts: u32 },
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// True for errors raised while resolving configuration, before any network call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration { .. }
                | Error::SecretsFile { .. }
                | Error::InvalidTemperature { .. }
                | Error::InvalidMaxTokens { .. }
                | Error::InvalidMaxAttempts { .. }
        )
    }
}
