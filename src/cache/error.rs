//! Errors surfaced by the health cache.

use std::time::Duration;

use thiserror::Error;

use crate::topology::DirectoryError;
use crate::transport::TransportError;

/// Errors returned from `HealthCache::get`.
///
/// Everything except `Cancelled` and `DeadlineExceeded` is the terminal error
/// of a streaming task and is replayed to every waiter of that task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    /// The node could not be resolved to an endpoint.
    #[error("resolve failed: {0}")]
    Resolve(DirectoryError),

    /// The health stream could not be opened.
    #[error("dial failed: {0}")]
    Connect(TransportError),

    /// The health stream failed after it was opened.
    #[error("health stream failed: {0}")]
    Stream(TransportError),

    /// The cache was shut down while the stream was running.
    #[error("health stream shut down")]
    Shutdown,

    /// The caller cancelled its wait.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline passed before a result was available.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

impl HealthError {
    /// True for errors that concern a single caller rather than the stream.
    pub fn is_caller_local(&self) -> bool {
        matches!(self, HealthError::Cancelled | HealthError::DeadlineExceeded(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            HealthError::Resolve(_) => "resolve",
            HealthError::Connect(_) => "connect",
            HealthError::Stream(_) => "stream",
            HealthError::Shutdown => "shutdown",
            HealthError::Cancelled => "cancelled",
            HealthError::DeadlineExceeded(_) => "deadline",
        }
    }
}

impl From<DirectoryError> for HealthError {
    fn from(err: DirectoryError) -> Self {
        HealthError::Resolve(err)
    }
}
