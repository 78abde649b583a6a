//! Launch orchestration shared by the manual and automatic triggers.

use tracing::{info, warn, Instrument};

use gridrun_core::{LaunchRequest, RunId, Task};

use crate::context::{LaunchContext, LaunchMode};
use crate::dispatch::AsyncDispatcher;
use crate::error::LaunchError;
use crate::gate::{LaunchGate, LaunchPermit};
use crate::lifecycle::{RunStart, TaskLifecycleCoordinator};
use crate::mapper::{FileResourceMapper, MappedFiles};
use crate::reference::ReferenceDocumentParser;
use crate::resolver;

/// Log target for business events.
pub const EVENTS: &str = "gridrun::events";

/// Record that `task` was asked to launch in a status that does not allow it.
pub(crate) fn log_not_ready(task: &Task) {
    warn!(
        target: EVENTS,
        task_id = %task.id,
        status = %task.status,
        "Failed to launch task with timestamp {} because it is not ready yet",
        task.timestamp
    );
}

/// How a launch attempt ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The compute engine was asked to start the run.
    Dispatched { run_id: RunId },
    /// The task manager refused the run; the task was set to error.
    Aborted,
    /// The task is not in a launchable status.
    NotReady,
    /// Every trigger file of the update was already used by a run.
    AlreadyLaunched,
}

/// Resolves a task's inputs, records the run and dispatches it.
#[derive(Clone)]
pub struct LaunchService {
    gate: LaunchGate,
    parser: ReferenceDocumentParser,
    mapper: FileResourceMapper,
    coordinator: TaskLifecycleCoordinator,
    dispatcher: AsyncDispatcher,
}

impl LaunchService {
    pub fn new(
        gate: LaunchGate,
        parser: ReferenceDocumentParser,
        mapper: FileResourceMapper,
        coordinator: TaskLifecycleCoordinator,
        dispatcher: AsyncDispatcher,
    ) -> Self {
        Self {
            gate,
            parser,
            mapper,
            coordinator,
            dispatcher,
        }
    }

    pub fn gate(&self) -> &LaunchGate {
        &self.gate
    }

    /// Launch `task`, waiting for any launch of the same timestamp to finish.
    pub async fn launch(&self, task: Task, mode: LaunchMode) -> Result<LaunchOutcome, LaunchError> {
        let permit = self.gate.acquire(task.timestamp).await;
        self.launch_with_permit(permit, task, mode).await
    }

    /// Launch `task` under an already held permit.
    ///
    /// The permit is released once the run is recorded, before dispatch.
    pub async fn launch_with_permit(
        &self,
        permit: LaunchPermit,
        task: Task,
        mode: LaunchMode,
    ) -> Result<LaunchOutcome, LaunchError> {
        debug_assert_eq!(permit.timestamp(), &task.timestamp);
        let ctx = LaunchContext::for_task(&task, mode);
        let span = ctx.span();
        self.run(permit, task, ctx).instrument(span).await
    }

    async fn run(
        &self,
        permit: LaunchPermit,
        task: Task,
        ctx: LaunchContext,
    ) -> Result<LaunchOutcome, LaunchError> {
        let mapped = self.prepare(&task).await?;
        info!(target: EVENTS, "Task launched on TS {}", task.timestamp);

        let run_id = match self.coordinator.start_run(&ctx, &mapped.snapshot).await? {
            RunStart::Started(run_id) => run_id,
            RunStart::Aborted => return Ok(LaunchOutcome::Aborted),
        };
        drop(permit);

        let request = LaunchRequest {
            id: task.id,
            run_id: run_id.clone(),
            timestamp: task.timestamp,
            files: mapped.files,
            launched_automatically: ctx.mode.is_automatic(),
            task_parameter_list: task.parameters,
        };
        self.dispatcher.dispatch(request);

        Ok(LaunchOutcome::Dispatched { run_id })
    }

    /// Resolve every input file of `task`.
    async fn prepare(&self, task: &Task) -> Result<MappedFiles, LaunchError> {
        let request_file = self.mapper.find_reference_request(task)?;
        let request_resource = self.mapper.to_resource(request_file).await?;

        let document = self.parser.import(&request_resource.url).await?;
        let document_ids = resolver::resolve_document_ids(&document, &task.timestamp)?;

        self.mapper
            .map(task, (request_file, request_resource), &document_ids)
            .await
    }
}
