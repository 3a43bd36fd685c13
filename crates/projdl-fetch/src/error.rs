//! Error types for projdl-fetch.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error status {status}")]
    HttpStatus { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timeout")]
    Timeout,

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("max retries exceeded ({count} attempts): {last}")]
    MaxRetriesExceeded { count: u32, last: String },

    #[error("clone exited unsuccessfully ({0})")]
    CloneFailed(String),

    #[error(transparent)]
    Platform(#[from] projdl_platform::Error),

    #[error("file I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FetchError {
    /// Errors worth another attempt: anything but a malformed URL.
    pub fn is_retryable(&self) -> bool { !matches!(self, FetchError::InvalidUrl(_)) }
}

pub type Result<T> = std::result::Result<T, FetchError>;
