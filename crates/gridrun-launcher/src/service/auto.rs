//! Launches triggered by task update notifications.

use std::sync::Arc;

use tokio_stream::{Stream, StreamExt};
use tracing::{error, info};

use gridrun_core::{Task, TaskStatus, Timestamp};

use crate::context::LaunchMode;
use crate::error::LaunchError;
use crate::ports::TaskSource;
use crate::service::launch::{log_not_ready, LaunchOutcome, LaunchService};

/// Launches ready tasks as their updates arrive.
#[derive(Clone)]
pub struct AutoLauncher {
    tasks: Arc<dyn TaskSource>,
    launcher: LaunchService,
    trigger_file_types: Vec<String>,
}

impl AutoLauncher {
    pub fn new(
        tasks: Arc<dyn TaskSource>,
        launcher: LaunchService,
        trigger_file_types: Vec<String>,
    ) -> Self {
        Self {
            tasks,
            launcher,
            trigger_file_types,
        }
    }

    /// Handle updates until the stream ends.
    pub async fn consume<S>(&self, updates: S)
    where
        S: Stream<Item = Task>,
    {
        tokio::pin!(updates);
        while let Some(task) = updates.next().await {
            self.on_task_update(task).await;
        }
        info!("Task update stream closed");
    }

    /// Launch the task of `update` if it is ready and has unused trigger files.
    ///
    /// The update only triggers the launch. The task itself is read again
    /// from the task manager once the permit is held. Errors are logged and
    /// swallowed so the next update is still handled.
    pub async fn on_task_update(&self, update: Task) -> Option<LaunchOutcome> {
        if update.status != TaskStatus::Ready {
            log_not_ready(&update);
            return None;
        }

        let timestamp = update.timestamp;
        match self.launch_current(timestamp).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(timestamp = %timestamp, error = %e, "Automatic launch failed");
                None
            }
        }
    }

    async fn launch_current(&self, timestamp: Timestamp) -> Result<LaunchOutcome, LaunchError> {
        // Fetch under the permit so a queued update sees the previous launch.
        let permit = self.launcher.gate().acquire(timestamp).await;
        let task = self
            .tasks
            .get_task(&timestamp)
            .await
            .map_err(|e| LaunchError::TaskSource(e.to_string()))?
            .ok_or_else(|| LaunchError::TaskNotFound(timestamp.to_string()))?;

        if task.status != TaskStatus::Ready {
            log_not_ready(&task);
            return Ok(LaunchOutcome::NotReady);
        }
        if self.all_trigger_files_already_used(&task) {
            info!(timestamp = %timestamp, "Trigger files already used by a run, not launching");
            return Ok(LaunchOutcome::AlreadyLaunched);
        }

        self.launcher
            .launch_with_permit(permit, task, LaunchMode::Automatic)
            .await
    }

    fn all_trigger_files_already_used(&self, task: &Task) -> bool {
        if self.trigger_file_types.is_empty() {
            return false;
        }

        task.inputs
            .iter()
            .filter(|file| self.trigger_file_types.contains(&file.file_type))
            .all(|file| task.run_history.iter().any(|run| run.inputs.contains(file)))
    }
}
