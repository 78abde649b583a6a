//! Fire-and-forget hand-off to the compute engine.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, Instrument};

use gridrun_core::LaunchRequest;

use crate::ports::ComputeRunner;

/// Sends launch requests to the compute engine without waiting for them.
#[derive(Clone)]
pub struct AsyncDispatcher {
    runner: Arc<dyn ComputeRunner>,
}

impl AsyncDispatcher {
    pub fn new(runner: Arc<dyn ComputeRunner>) -> Self {
        Self { runner }
    }

    /// Start the compute call on a background task.
    ///
    /// Failures are only logged. The handle may be dropped.
    pub fn dispatch(&self, request: LaunchRequest) -> JoinHandle<()> {
        let runner = self.runner.clone();
        let span = tracing::Span::current();

        tokio::spawn(
            async move {
                match runner.run(&request).await {
                    Ok(()) => info!(run_id = %request.run_id, "Compute run requested"),
                    Err(e) => error!(run_id = %request.run_id, error = %e, "Compute run request failed"),
                }
            }
            .instrument(span),
        )
    }
}
