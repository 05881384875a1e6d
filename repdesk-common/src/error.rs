//! Common error types for the repertory desk

use thiserror::Error;

/// Common result type for repertory desk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across repertory desk services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error, including missing credentials
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Non-success answer from a third-party provider (renderer, mail)
    #[error("{provider} returned {status}: {message}")]
    Upstream {
        provider: String,
        status: u16,
        message: String,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an upstream error from a provider name, HTTP status and body text
    pub fn upstream(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Error::Upstream {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }
}
