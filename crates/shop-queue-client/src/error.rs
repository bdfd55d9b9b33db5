//! Error types for shop queue operations.

use thiserror::Error;

/// Error type for fetch and acknowledge calls against the shop API.
#[derive(Error, Debug)]
pub enum QueueError {
    /// Transport-level HTTP failure (timeout, connection refused, DNS).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The fetch endpoint returned a non-success HTTP status.
    #[error("Fetch failed: HTTP {status}")]
    FetchFailed {
        /// The HTTP status code returned by the shop API.
        status: u16,
    },

    /// The fetch response body was unparseable or structurally invalid.
    ///
    /// A malformed element fails the whole fetch; the batch is retried intact
    /// on the next cycle rather than partially delivered.
    #[error("Malformed fetch response: {0}")]
    MalformedResponse(String),

    /// The acknowledge endpoint returned a non-success HTTP status.
    ///
    /// Never retried and never surfaced past the caller's log line; the next
    /// fetch cycle re-delivers anything left unacknowledged.
    #[error("Acknowledge failed: HTTP {status}")]
    AcknowledgeFailed {
        /// The HTTP status code returned by the shop API.
        status: u16,
    },
}

/// Result type alias using QueueError.
pub type QueueResult<T> = Result<T, QueueError>;
