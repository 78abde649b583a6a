//! Error types for the launch pipeline.

use thiserror::Error;

use gridrun_core::{CoreError, Timestamp};

/// Errors raised while loading a reference document.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document bytes could not be downloaded.
    #[error("Cannot download reference document from '{url}': {reason}")]
    Transport { url: String, reason: String },

    /// The bytes are not a well-formed reference document.
    #[error("Malformed reference document: {0}")]
    Malformed(String),
}

/// Errors raised by a [`DocumentFetcher`](crate::ports::DocumentFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL does not start with any whitelisted prefix.
    #[error("URL '{url}' is not part of application's whitelisted urls: {}", .whitelist.join(", "))]
    InvalidUrl { url: String, whitelist: Vec<String> },

    /// The download failed.
    #[error("Cannot download '{url}': {reason}")]
    Transport { url: String, reason: String },
}

/// Errors raised by an [`ObjectStorage`](crate::ports::ObjectStorage).
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage endpoint or an object path cannot be used.
    #[error("Invalid storage location '{0}'")]
    InvalidLocation(String),

    /// The storage client refused to presign the request.
    #[error("Cannot presign storage request: {0}")]
    Presigning(String),
}

/// Errors that abort a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// A required input file is absent.
    #[error("{0}")]
    MissingFile(String),

    /// The reference document could not be loaded.
    #[error("Error occurred during loading of RAOREQUEST file content: {0}")]
    Import(#[from] ImportError),

    /// No manifest entry covers the task timestamp.
    #[error("No data for timestamp {0} in RAOREQUEST file")]
    NoDataForTimestamp(Timestamp),

    /// A download URL was rejected by the whitelist.
    #[error("URL '{url}' is not part of application's whitelisted urls: {}", .whitelist.join(", "))]
    InvalidUrl { url: String, whitelist: Vec<String> },

    /// The task manager broke its contract during the lifecycle transition.
    #[error("Task manager protocol violation: {0}")]
    Coordinator(String),

    /// The task manager has no task for the timestamp.
    #[error("No task found for timestamp {0}")]
    TaskNotFound(String),

    /// The requested timestamp could not be parsed.
    #[error(transparent)]
    InvalidTimestamp(#[from] CoreError),

    /// The task manager could not be reached.
    #[error("Task manager unavailable: {0}")]
    TaskSource(String),

    /// A file could not be turned into a download URL.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LaunchError {
    /// Returns true for failures caused by the request or the task's data,
    /// as opposed to an unavailable collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFile(_)
                | Self::Import(_)
                | Self::NoDataForTimestamp(_)
                | Self::InvalidUrl { .. }
                | Self::InvalidTimestamp(_)
        )
    }
}

impl From<FetchError> for LaunchError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidUrl { url, whitelist } => Self::InvalidUrl { url, whitelist },
            FetchError::Transport { url, reason } => {
                Self::Import(ImportError::Transport { url, reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_message_lists_prefixes() {
        let err = LaunchError::from(FetchError::InvalidUrl {
            url: "http://evil/file".into(),
            whitelist: vec!["http://minio:9000/".into(), "http://other/".into()],
        });
        assert_eq!(
            err.to_string(),
            "URL 'http://evil/file' is not part of application's whitelisted urls: http://minio:9000/, http://other/"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_transport_failure_is_an_import_error() {
        let err = LaunchError::from(FetchError::Transport {
            url: "http://minio/raorequest.xml".into(),
            reason: "connection refused".into(),
        });
        assert!(matches!(err, LaunchError::Import(ImportError::Transport { .. })));
    }

    #[test]
    fn test_collaborator_failures_are_not_client_errors() {
        assert!(!LaunchError::Coordinator("no run".into()).is_client_error());
        assert!(!LaunchError::TaskSource("down".into()).is_client_error());
        assert!(!LaunchError::TaskNotFound("2024-06-18T09:30Z".into()).is_client_error());
    }
}
