//! GridRun Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Object storage
//! - Runtime specifics
//!
//! Tasks, their input files and the launch request handed to the compute
//! engine all live here.

pub mod error;
pub mod file;
pub mod ids;
pub mod request;
pub mod status;
pub mod task;
pub mod time;

// Re-export commonly used types
pub use error::CoreError;
pub use file::{FileResource, FileType, ProcessFile};
pub use ids::{RunId, TaskId};
pub use request::{LaunchRequest, ResolvedFileSet};
pub use status::{ProcessFileStatus, TaskStatus};
pub use task::{Run, Task, TaskParameter};
pub use time::{Interval, Timestamp};
