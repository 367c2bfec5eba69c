//! Unified error types for preture.
//!
//! Display strings carry an upper-case code prefix so log lines stay greppable.

use std::fmt;

use tokio_rusqlite::rusqlite;

use crate::config::ConfigError;

/// Failure of a single network fetch.
///
/// Cloneable so that every caller waiting on the same in-flight request
/// receives its own copy of the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    /// URL that was requested.
    pub url: String,
    /// HTTP status, when the server answered with a non-success code.
    pub status: Option<u16>,
    /// Human readable cause (status line or transport error).
    pub cause: String,
}

impl FetchError {
    /// Non-success HTTP status.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self { url: url.into(), status: Some(status), cause: format!("bad response: {status}") }
    }

    /// Transport-level failure (DNS, TLS, connection reset, body decode).
    pub fn transport(url: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self { url: url.into(), status: None, cause: cause.to_string() }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.cause)
    }
}

impl std::error::Error for FetchError {}

/// Unified error type for preture.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A non-textual value was handed to the page cache.
    #[error("TYPE_ERROR: {0}")]
    Type(String),

    /// Network fetch failed (bad status or transport error).
    #[error("FETCH_ERROR: {0}")]
    Fetch(FetchError),

    /// URL could not be parsed or resolved.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Store operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// HTML rewriting failed.
    #[error("REWRITE_FAILED: {0}")]
    Rewrite(String),

    /// Configuration could not be loaded or failed validation.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    /// The host rejected a script during document replacement.
    #[error("SCRIPT_FAILED: {0}")]
    Script(String),
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Error::Fetch(err)
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
