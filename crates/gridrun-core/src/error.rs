//! Core domain errors.

use thiserror::Error;

/// Core domain errors for GridRun.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A string could not be read as an ISO-8601 instant.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A string could not be read as an ISO-8601 `start/end` interval.
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}
