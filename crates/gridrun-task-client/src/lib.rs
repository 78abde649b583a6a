//! HTTP clients used by the GridRun launcher.
//!
//! - [`TaskManagerClient`] reads tasks and records launches
//! - [`ComputeClient`] submits launch requests to the compute engine
//! - [`StatusUpdatePublisher`] reports failed launches

pub mod compute;
pub mod error;
pub mod status;
pub mod task_manager;

pub use compute::ComputeClient;
pub use error::ClientError;
pub use status::{StatusUpdatePublisher, TaskStatusUpdate};
pub use task_manager::TaskManagerClient;
