use std::fmt;

use tracing::debug;

/// Which way a payload is travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outbound => write!(f, "Outbound"),
            Direction::Inbound => write!(f, "Inbound"),
        }
    }
}

/// Hook invoked with every request and response body the client exchanges.
pub trait PayloadTap: Send + Sync {
    fn observe(&self, direction: Direction, operation: &str, body: &[u8]);
}

/// Logs payloads at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTap;

impl PayloadTap for TracingTap {
    fn observe(&self, direction: Direction, operation: &str, body: &[u8]) {
        debug!(
            operation,
            bytes = body.len(),
            "{direction} message:\n{}",
            String::from_utf8_lossy(body)
        );
    }
}
