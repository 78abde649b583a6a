//! Publisher for task status updates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridrun_core::{TaskId, TaskStatus};

use crate::error::ClientError;

/// Status update notification body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdate {
    pub id: TaskId,
    pub task_status: TaskStatus,
}

/// Publishes status updates to the task manager's update endpoint.
#[derive(Debug, Clone)]
pub struct StatusUpdatePublisher {
    inner: reqwest::Client,
    url: String,
}

impl StatusUpdatePublisher {
    /// Create a publisher posting to `url`.
    pub fn new(url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    /// Publish a status for a task.
    pub async fn publish(&self, id: &TaskId, status: TaskStatus) -> Result<(), ClientError> {
        let update = TaskStatusUpdate {
            id: id.clone(),
            task_status: status,
        };
        debug!(url = %self.url, task_id = %id, status = %status, "Publishing status update");

        let response = self.inner.post(&self.url).json(&update).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                url: self.url.clone(),
            });
        }
        Ok(())
    }
}
