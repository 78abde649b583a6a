//! HTTP client for the task manager REST API.

use reqwest::StatusCode;
use tracing::{debug, warn};

use gridrun_core::{ProcessFile, Task, TaskStatus, Timestamp};

use crate::error::ClientError;

/// Client for the task manager's timestamp-addressed endpoints.
///
/// Every URL is `{base}/{timestamp}[/...]`, e.g.
/// `http://task-manager/tasks/2024-06-18T09:30Z/status?status=PENDING`.
#[derive(Debug, Clone)]
pub struct TaskManagerClient {
    inner: reqwest::Client,
    timestamp_base_url: String,
}

impl TaskManagerClient {
    /// Create a new client for the given base URL.
    pub fn new(timestamp_base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), timestamp_base_url)
    }

    /// Create a client reusing an existing reqwest client.
    pub fn with_client(inner: reqwest::Client, timestamp_base_url: &str) -> Self {
        Self {
            inner,
            timestamp_base_url: timestamp_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn task_url(&self, timestamp: &Timestamp) -> String {
        format!("{}/{}", self.timestamp_base_url, timestamp)
    }

    /// Fetch the task for a timestamp. `None` if the task manager has none.
    pub async fn get_task(&self, timestamp: &Timestamp) -> Result<Option<Task>, ClientError> {
        let url = self.task_url(timestamp);
        debug!(url = %url, "GET task");

        let response = self.inner.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }

    /// Set the task status. Returns false if the task manager refused.
    pub async fn update_status(
        &self,
        timestamp: &Timestamp,
        status: TaskStatus,
    ) -> Result<bool, ClientError> {
        let url = format!("{}/status", self.task_url(timestamp));
        debug!(url = %url, status = %status, "PUT task status");

        let response = self
            .inner
            .put(&url)
            .query(&[("status", status.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "Task manager refused status update");
            return Ok(false);
        }
        Ok(true)
    }

    /// Append a run using `inputs` to the task history.
    ///
    /// Returns the updated task, or `None` if the task manager refused.
    pub async fn append_run_history(
        &self,
        timestamp: &Timestamp,
        inputs: &[ProcessFile],
    ) -> Result<Option<Task>, ClientError> {
        let url = format!("{}/runHistory", self.task_url(timestamp));
        debug!(url = %url, files = inputs.len(), "PUT run history");

        let response = self.inner.put(&url).json(inputs).send().await?;
        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "Task manager refused run history update");
            return Ok(None);
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }
}
