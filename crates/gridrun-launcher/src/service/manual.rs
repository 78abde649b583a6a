//! Launches requested explicitly for a timestamp.

use std::sync::Arc;

use tracing::info;

use gridrun_core::{TaskParameter, Timestamp};

use crate::context::LaunchMode;
use crate::error::LaunchError;
use crate::ports::TaskSource;
use crate::service::launch::{log_not_ready, LaunchOutcome, LaunchService};

/// Handles launch requests addressed by timestamp.
#[derive(Clone)]
pub struct ManualLauncher {
    tasks: Arc<dyn TaskSource>,
    launcher: LaunchService,
}

impl ManualLauncher {
    pub fn new(tasks: Arc<dyn TaskSource>, launcher: LaunchService) -> Self {
        Self { tasks, launcher }
    }

    /// Launch the task at `timestamp`.
    ///
    /// A non-empty `parameters` list replaces the task's own parameters.
    pub async fn launch_job(
        &self,
        timestamp: &str,
        parameters: Vec<TaskParameter>,
    ) -> Result<LaunchOutcome, LaunchError> {
        info!(timestamp = %timestamp, "Received order to launch task");
        let timestamp: Timestamp = timestamp.parse()?;

        // Fetch under the permit so a queued request sees the previous launch.
        let permit = self.launcher.gate().acquire(timestamp).await;
        let task = self
            .tasks
            .get_task(&timestamp)
            .await
            .map_err(|e| LaunchError::TaskSource(e.to_string()))?
            .ok_or_else(|| LaunchError::TaskNotFound(timestamp.to_string()))?;

        if !task.status.accepts_manual_launch() {
            log_not_ready(&task);
            return Ok(LaunchOutcome::NotReady);
        }

        let task = if parameters.is_empty() {
            task
        } else {
            task.with_parameters(parameters)
        };
        self.launcher
            .launch_with_permit(permit, task, LaunchMode::Manual)
            .await
    }
}
