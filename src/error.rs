//! Error types

use thiserror::Error;

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error used for opaque transport and middleware failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by [`Client`](crate::Client) calls
#[derive(Debug, Error)]
pub enum Error {
    /// The address was malformed or the request could not be assembled
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// JSON serialization/deserialization error
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The middleware hook rejected the request
    #[error("Middleware rejected request: {0}")]
    Middleware(#[source] BoxError),

    /// Network or transport-level failure, passed through as-is
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// A multipart writer was used after it was closed or with malformed part data
    #[error("Invalid multipart use: {0}")]
    InvalidMultipartUse(String),

    /// I/O error while producing or consuming a body
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a transport failure
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Error::Transport(err.into())
    }

    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    pub(crate) fn invalid_multipart(message: impl Into<String>) -> Self {
        Error::InvalidMultipartUse(message.into())
    }

    /// Returns true if the error came from the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Returns true if the request never left the client because it was malformed
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }
}
