//! Status enums for Tasks and their input files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a Task, as tracked by the task manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// No file has been received for this timestamp yet.
    #[default]
    NotCreated,
    /// Some input files are present, but not all of them.
    Created,
    /// A run has been requested and is waiting for the compute engine.
    Pending,
    /// The compute engine is working on the task.
    Running,
    /// A stop was requested for the current run.
    Stopping,
    /// The current run was stopped before completion.
    Interrupted,
    /// The last run completed successfully.
    Success,
    /// The last run, or the launch itself, failed.
    Error,
    /// Every required input is present.
    Ready,
}

impl TaskStatus {
    /// Returns true if a manual launch may be requested in this status.
    ///
    /// Finished tasks can be relaunched by hand; automatic launches only
    /// consider [`TaskStatus::Ready`].
    pub fn accepts_manual_launch(&self) -> bool {
        matches!(self, Self::Ready | Self::Success | Self::Error)
    }

    /// Wire representation, as used in task manager query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotCreated => "NOT_CREATED",
            Self::Created => "CREATED",
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Interrupted => "INTERRUPTED",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Ready => "READY",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation status of a single input file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessFileStatus {
    /// The file slot exists but nothing was uploaded.
    #[default]
    NotPresent,
    /// The file was uploaded and accepted.
    Validated,
    /// Any status this service has no use for.
    #[serde(other)]
    Other,
}
