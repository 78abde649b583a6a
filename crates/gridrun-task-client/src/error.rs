//! Error types for the HTTP clients.

use thiserror::Error;

/// Errors that can occur when talking to remote services.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected status.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
