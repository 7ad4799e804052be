//! Error types for the q_snake crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the q_snake crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown state representation '{name}' (expected one of: {expected})")]
    UnknownEncoder { name: String, expected: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("action index {index} is outside the action set (0..{count})")]
    InvalidAction { index: usize, count: usize },

    #[error("Q-table at {path:?} is malformed: {source}")]
    MalformedQTable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to {operation} {path:?}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
