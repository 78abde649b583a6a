//! Collaborators of the launch pipeline.
//!
//! Each trait is implemented by an HTTP client for production and by an
//! in-memory fake in tests.

use async_trait::async_trait;
use bytes::Bytes;

use gridrun_core::{LaunchRequest, ProcessFile, Task, TaskId, TaskStatus, Timestamp};
use gridrun_task_client::{ClientError, ComputeClient, StatusUpdatePublisher, TaskManagerClient};

use crate::error::{FetchError, StorageError};

/// Source of truth for tasks, addressed by timestamp.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch the task for a timestamp.
    async fn get_task(&self, timestamp: &Timestamp) -> Result<Option<Task>, ClientError>;

    /// Set the task status. `false` means the task manager refused.
    async fn update_status(
        &self,
        timestamp: &Timestamp,
        status: TaskStatus,
    ) -> Result<bool, ClientError>;

    /// Append a run to the task history. `None` means the task manager refused.
    async fn append_run_history(
        &self,
        timestamp: &Timestamp,
        inputs: &[ProcessFile],
    ) -> Result<Option<Task>, ClientError>;
}

/// Object storage able to hand out time-limited download URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn presigned_url(&self, path: &str, expiry_hours: u32) -> Result<String, StorageError>;
}

/// Downloads documents referenced by URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn open_stream(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Compute engine entry point.
#[async_trait]
pub trait ComputeRunner: Send + Sync {
    async fn run(&self, request: &LaunchRequest) -> Result<(), ClientError>;
}

/// Publishes task status changes.
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    async fn publish(&self, task_id: &TaskId, status: TaskStatus) -> Result<(), ClientError>;
}

#[async_trait]
impl TaskSource for TaskManagerClient {
    async fn get_task(&self, timestamp: &Timestamp) -> Result<Option<Task>, ClientError> {
        TaskManagerClient::get_task(self, timestamp).await
    }

    async fn update_status(
        &self,
        timestamp: &Timestamp,
        status: TaskStatus,
    ) -> Result<bool, ClientError> {
        TaskManagerClient::update_status(self, timestamp, status).await
    }

    async fn append_run_history(
        &self,
        timestamp: &Timestamp,
        inputs: &[ProcessFile],
    ) -> Result<Option<Task>, ClientError> {
        TaskManagerClient::append_run_history(self, timestamp, inputs).await
    }
}

#[async_trait]
impl ComputeRunner for ComputeClient {
    async fn run(&self, request: &LaunchRequest) -> Result<(), ClientError> {
        ComputeClient::run(self, request).await
    }
}

#[async_trait]
impl StatusPublisher for StatusUpdatePublisher {
    async fn publish(&self, task_id: &TaskId, status: TaskStatus) -> Result<(), ClientError> {
        StatusUpdatePublisher::publish(self, task_id, status).await
    }
}
