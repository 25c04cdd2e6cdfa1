use std::path::PathBuf;

use thiserror::Error;

use crate::dlws::RemoteError;
use crate::state_machine::{JobKind, StatusCode};

#[derive(Debug, Error)]
pub enum DatalicError {
    #[error("Both history and data jobs are set to skip. Nothing to do.")]
    NoOpConfiguration,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{kind} submission failed: {source}")]
    Submission {
        kind: JobKind,
        #[source]
        source: RemoteError,
    },

    #[error("{kind} status check failed: {source}")]
    PollFault {
        kind: JobKind,
        #[source]
        source: RemoteError,
    },

    #[error("{kind} response wasn't SUCCESS: {status}")]
    RemoteFailureStatus { kind: JobKind, status: StatusCode },

    #[error("Retry wait interrupted before attempt {attempt}")]
    WaitInterrupted { attempt: u32 },

    #[error("Failed to read {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DatalicError {
    /// Fatal errors abort the run; the rest are reported and the run finishes.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DatalicError::NoOpConfiguration | DatalicError::RemoteFailureStatus { .. }
        )
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() { 1 } else { 0 }
    }
}
