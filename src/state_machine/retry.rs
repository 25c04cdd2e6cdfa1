use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DatalicError;
use crate::shutdown::ShutdownCoordinator;

/// Shortest wait allowed between polling rounds.
pub const MIN_RETRY_WAIT_SECS: u64 = 5;
/// Wait used when neither config nor CLI sets one.
pub const DEFAULT_RETRY_WAIT_SECS: i64 = 30;

/// Raises a configured wait to the floor. Values at or above it pass through;
/// zero and negative values become the floor.
pub fn effective_wait_secs(configured: i64) -> u64 {
    u64::try_from(configured).map_or(MIN_RETRY_WAIT_SECS, |secs| secs.max(MIN_RETRY_WAIT_SECS))
}

/// Fixed-interval wait between polling rounds.
///
/// There is no attempt ceiling and no backoff. The only early exit is a
/// shutdown request, which turns the wait into [`DatalicError::WaitInterrupted`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryScheduler {
    wait_secs: u64,
    attempt: u32,
}

impl Default for RetryScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_WAIT_SECS)
    }
}

impl RetryScheduler {
    pub fn new(configured_secs: i64) -> Self {
        let wait_secs = effective_wait_secs(configured_secs);
        if i64::try_from(wait_secs) != Ok(configured_secs) {
            info!(
                configured = configured_secs,
                "retry wait below {MIN_RETRY_WAIT_SECS}s, resetting to {wait_secs}s"
            );
        }
        Self {
            wait_secs,
            attempt: 0,
        }
    }

    pub fn wait_secs(&self) -> u64 {
        self.wait_secs
    }

    pub fn wait_duration(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// Retry attempts started so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Starts the next retry attempt and returns its number (1-based).
    pub fn next_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    /// Sleeps for the effective wait unless shutdown is requested first.
    pub async fn wait(&self, shutdown: &ShutdownCoordinator) -> Result<(), DatalicError> {
        if shutdown.is_shutdown_requested() {
            return Err(DatalicError::WaitInterrupted {
                attempt: self.attempt,
            });
        }

        info!(attempt = self.attempt, "sleeping for {} seconds", self.wait_secs);
        tokio::select! {
            _ = tokio::time::sleep(self.wait_duration()) => Ok(()),
            _ = shutdown.wait_for_shutdown() => Err(DatalicError::WaitInterrupted {
                attempt: self.attempt,
            }),
        }
    }
}
