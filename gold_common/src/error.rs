//! Error types shared between the quote sources and the push binary.
//!
//! The `GoldError` enum unifies transport, decoding and payload-shape failures so
//! adapters can propagate with `?` and the orchestrator only ever sees one error type.
use thiserror::Error;

/// Unified error type shared by every crate in the workspace.
#[derive(Error, Debug)]
pub enum GoldError {
    /// Transport failure from the HTTP client (timeout, refused connection, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status that was not (or no longer) retried.
    #[error("HTTP status {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Final status code.
        status: u16,
    },

    /// Failure while decoding JSON via serde_json.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload decoded but did not have the expected shape (missing field, bad number, ...).
    #[error("Unexpected payload: {0}")]
    Shape(String),

    /// Acquisition was cancelled before the call could complete.
    #[error("Cancelled")]
    Cancelled,

    /// A source panicked while being polled; contains the source name.
    #[error("Source panicked: {0}")]
    Panic(String),

    /// Invalid or missing configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// The push gateway answered but refused the message.
    #[error("Push rejected: {0}")]
    Push(String),
}

impl GoldError {
    /// Shorthand for a `Shape` error.
    pub fn shape(msg: impl Into<String>) -> Self {
        GoldError::Shape(msg.into())
    }
}
