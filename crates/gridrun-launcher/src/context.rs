//! Diagnostic context carried through one launch.

use tracing::{info_span, Span};

use gridrun_core::{Task, TaskId, Timestamp};

/// What triggered a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Explicit request on the HTTP endpoint.
    Manual,
    /// Task update notification.
    Automatic,
}

impl LaunchMode {
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::Automatic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
        }
    }
}

/// Identifies the launch in every log line emitted on its behalf.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub task_id: TaskId,
    pub timestamp: Timestamp,
    pub mode: LaunchMode,
}

impl LaunchContext {
    pub fn for_task(task: &Task, mode: LaunchMode) -> Self {
        Self {
            task_id: task.id.clone(),
            timestamp: task.timestamp,
            mode,
        }
    }

    /// Span to enter for the duration of the launch.
    pub fn span(&self) -> Span {
        info_span!(
            "launch",
            task_id = %self.task_id,
            timestamp = %self.timestamp,
            mode = self.mode.as_str()
        )
    }
}
