//! Error types for the Pastebin client

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T, E = PastebinError> = std::result::Result<T, E>;

/// Errors raised by a [`Transport`](crate::Transport) while exchanging a request
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP request could not be sent or its response could not be read
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Failed to decode response as UTF-8
    #[error("Failed to decode response as UTF-8")]
    Encoding,

    /// Any other transport failure (used by substitute transports)
    #[error("{0}")]
    Other(String),
}

/// Errors that can occur when talking to Pastebin
#[derive(Error, Debug)]
pub enum PastebinError {
    /// The operation needs a session token and the client holds none
    #[error("must be authenticated to perform this action")]
    Unauthenticated,

    /// The request never produced an HTTP response
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid HTTP status code received
    #[error("Invalid HTTP status: {status}")]
    InvalidStatus {
        /// The status code that was received
        status: reqwest::StatusCode,
        /// The response body, possibly empty
        body: String,
    },

    /// A 2xx response whose body is one of Pastebin's plain-text error strings
    #[error("{0}")]
    Api(String),

    /// Logging in again after a stale session token failed
    #[error("failed to re-authenticate on invalid api_user_key response: {0}")]
    Reauthentication(#[source] Box<PastebinError>),

    /// A scraping API document was not valid JSON
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured base URL cannot be used to build endpoint URLs
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Client initialization failed
    #[error("Client initialization failed: {0}")]
    ClientInit(String),
}
