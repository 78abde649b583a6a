//! Task state transition performed when a run starts.

use std::sync::Arc;

use tracing::{info, warn};

use gridrun_core::{ProcessFile, RunId, TaskStatus};

use crate::context::LaunchContext;
use crate::error::LaunchError;
use crate::ports::{StatusPublisher, TaskSource};

/// Result of [`TaskLifecycleCoordinator::start_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStart {
    /// The run is recorded and the task is pending.
    Started(RunId),
    /// The task manager refused; the task was set to error.
    Aborted,
}

/// Records the run and moves the task to pending.
#[derive(Clone)]
pub struct TaskLifecycleCoordinator {
    tasks: Arc<dyn TaskSource>,
    publisher: Arc<dyn StatusPublisher>,
}

impl TaskLifecycleCoordinator {
    pub fn new(tasks: Arc<dyn TaskSource>, publisher: Arc<dyn StatusPublisher>) -> Self {
        Self { tasks, publisher }
    }

    /// Append a run using `snapshot`, set the task pending and return the
    /// id of the newest run.
    ///
    /// A refused step is not rolled back.
    pub async fn start_run(
        &self,
        ctx: &LaunchContext,
        snapshot: &[ProcessFile],
    ) -> Result<RunStart, LaunchError> {
        match self.tasks.append_run_history(&ctx.timestamp, snapshot).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(self.abort(ctx, "run history was not updated").await),
            Err(e) => return Ok(self.abort(ctx, &e.to_string()).await),
        }

        match self.tasks.update_status(&ctx.timestamp, TaskStatus::Pending).await {
            Ok(true) => {}
            Ok(false) => return Ok(self.abort(ctx, "status was not set to PENDING").await),
            Err(e) => return Ok(self.abort(ctx, &e.to_string()).await),
        }

        let task = self
            .tasks
            .get_task(&ctx.timestamp)
            .await
            .map_err(|e| LaunchError::Coordinator(format!("cannot re-fetch task: {}", e)))?
            .ok_or_else(|| {
                LaunchError::Coordinator(format!("task {} disappeared after run creation", ctx.timestamp))
            })?;

        let run = task.latest_run().ok_or_else(|| {
            LaunchError::Coordinator(format!("task {} has no run after run creation", ctx.timestamp))
        })?;

        info!(run_id = %run.id, "Run recorded, task pending");
        Ok(RunStart::Started(run.id.clone()))
    }

    async fn abort(&self, ctx: &LaunchContext, reason: &str) -> RunStart {
        warn!(reason = %reason, "Task manager refused the run, marking task as ERROR");
        if let Err(e) = self.publisher.publish(&ctx.task_id, TaskStatus::Error).await {
            warn!(error = %e, "Failed to publish ERROR status");
        }
        RunStart::Aborted
    }
}
