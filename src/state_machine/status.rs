use std::fmt;

use serde::{Deserialize, Serialize};

/// Remote code for a request that completed successfully.
pub const SUCCESS: i32 = 0;
/// Remote code for a request that was accepted but whose result is not ready.
pub const DATA_NOT_AVAILABLE: i32 = 100;
/// Remote code for a request the service rejected.
pub const REQUEST_ERROR: i32 = 200;

/// Where a job stands after its most recent status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Retrieved,
    Failed,
}

impl JobStatus {
    /// Retrieved and Failed are terminal; a terminal job is never polled again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "PENDING"),
            JobStatus::Retrieved => write!(f, "RETRIEVED"),
            JobStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Raw status as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode {
    pub code: i32,
    #[serde(default)]
    pub description: String,
}

impl StatusCode {
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    pub fn classify(&self) -> JobStatus {
        classify(self.code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.description)
    }
}

/// Maps a remote status code onto a job status.
///
/// Only [`DATA_NOT_AVAILABLE`] keeps a job pending. Every code other than
/// [`SUCCESS`] is terminal, including codes the service may consider
/// transient.
pub fn classify(code: i32) -> JobStatus {
    match code {
        DATA_NOT_AVAILABLE => JobStatus::Pending,
        SUCCESS => JobStatus::Retrieved,
        _ => JobStatus::Failed,
    }
}
