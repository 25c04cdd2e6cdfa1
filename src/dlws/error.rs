//! Errors raised at the boundary with the remote data-license service.
//!
//! The controller does not distinguish between these kinds: any of them
//! during submission or a status check aborts the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service answered with a non-2xx HTTP status.
    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// DNS failure, refused connection, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A body could not be encoded or decoded.
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The reply decoded but broke the call contract (e.g. no response id).
    #[error("protocol error: {0}")]
    Protocol(String),
}
